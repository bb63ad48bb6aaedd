//! Command-line flags. Anything not given falls back to the config file, then
//! to the built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use pbxgauge_core::FailurePolicy;

use crate::config::ExporterConfig;

#[derive(Parser, Debug, Default)]
#[command(name = "pbxgauge-exporter")]
#[command(about = "Prometheus exporter for FusionPBX call statistics")]
#[command(version)]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// PostgreSQL username [default: fusionpbx]
    #[arg(long)]
    pub user: Option<String>,

    /// PostgreSQL password [default: password]
    #[arg(long)]
    pub password: Option<String>,

    /// PostgreSQL database name [default: fusionpbx]
    #[arg(long)]
    pub dbname: Option<String>,

    /// PostgreSQL host [default: localhost]
    #[arg(long)]
    pub host: Option<String>,

    /// PostgreSQL port [default: 5432]
    #[arg(long)]
    pub port: Option<u16>,

    /// Address the /metrics endpoint listens on [default: [::]:8080]
    #[arg(long)]
    pub listen: Option<String>,

    /// Pause between the end of one refresh and the start of the next [default: 10000]
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Deadline for each query [default: 5000]
    #[arg(long)]
    pub query_timeout_ms: Option<u64>,

    /// Deadline for opening the database connection [default: 5000]
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// What to do when a refresh fails: retry on the next tick, or exit [default: retry]
    #[arg(long)]
    pub on_error: Option<FailurePolicy>,
}

impl Cli {
    pub fn apply(&self, cfg: &mut ExporterConfig) {
        let db = &mut cfg.database;
        if let Some(v) = &self.user {
            db.user = v.clone();
        }
        if let Some(v) = &self.password {
            db.password = v.clone();
        }
        if let Some(v) = &self.dbname {
            db.dbname = v.clone();
        }
        if let Some(v) = &self.host {
            db.host = v.clone();
        }
        if let Some(v) = self.port {
            db.port = v;
        }
        if let Some(v) = &self.listen {
            cfg.exporter.listen = v.clone();
        }

        let refresh = &mut cfg.refresh;
        if let Some(v) = self.interval_ms {
            refresh.interval_ms = v;
        }
        if let Some(v) = self.query_timeout_ms {
            refresh.query_timeout_ms = v;
        }
        if let Some(v) = self.connect_timeout_ms {
            refresh.connect_timeout_ms = v;
        }
        if let Some(v) = self.on_error {
            refresh.on_error = v;
        }
    }
}
