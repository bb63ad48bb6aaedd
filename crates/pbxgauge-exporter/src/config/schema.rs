use std::fmt;
use std::net::SocketAddr;

use serde::Deserialize;

use pbxgauge_core::error::{ExporterError, Result};
use pbxgauge_core::FailurePolicy;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub refresh: RefreshSection,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            database: DatabaseSection::default(),
            exporter: ExporterSection::default(),
            refresh: RefreshSection::default(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ExporterError::Config(format!(
                "unsupported config version {} (expected 1)",
                self.version
            )));
        }
        self.database.validate()?;
        self.exporter.validate()?;
        self.refresh.validate()?;
        Ok(())
    }
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSection {
    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_dbname")]
    pub dbname: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            user: default_user(),
            password: default_password(),
            dbname: default_dbname(),
            host: default_host(),
            port: default_port(),
        }
    }
}

// Keep the password out of logs.
impl fmt::Debug for DatabaseSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSection")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl DatabaseSection {
    pub fn validate(&self) -> Result<()> {
        for (field, v) in [("user", &self.user), ("dbname", &self.dbname), ("host", &self.host)] {
            if v.trim().is_empty() {
                return Err(ExporterError::Config(format!("database.{field} must not be empty")));
            }
        }
        if self.port == 0 {
            return Err(ExporterError::Config("database.port must not be 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl ExporterSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            ExporterError::Config(format!("exporter.listen {:?} is not a socket address: {e}", self.listen))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshSection {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default)]
    pub on_error: FailurePolicy,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            query_timeout_ms: default_query_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            on_error: FailurePolicy::default(),
        }
    }
}

impl RefreshSection {
    pub fn validate(&self) -> Result<()> {
        if !(1_000..=3_600_000).contains(&self.interval_ms) {
            return Err(ExporterError::Config(
                "refresh.interval_ms must be between 1000 and 3600000".into(),
            ));
        }
        if !(100..=600_000).contains(&self.query_timeout_ms) {
            return Err(ExporterError::Config(
                "refresh.query_timeout_ms must be between 100 and 600000".into(),
            ));
        }
        if !(100..=600_000).contains(&self.connect_timeout_ms) {
            return Err(ExporterError::Config(
                "refresh.connect_timeout_ms must be between 100 and 600000".into(),
            ));
        }
        Ok(())
    }
}

fn default_user() -> String {
    "fusionpbx".into()
}
fn default_password() -> String {
    "password".into()
}
fn default_dbname() -> String {
    "fusionpbx".into()
}
fn default_host() -> String {
    "localhost".into()
}
fn default_port() -> u16 {
    5432
}
// Unspecified IPv6 accepts IPv4 too on dual-stack hosts.
fn default_listen() -> String {
    "[::]:8080".into()
}
fn default_interval_ms() -> u64 {
    10_000
}
fn default_query_timeout_ms() -> u64 {
    5_000
}
fn default_connect_timeout_ms() -> u64 {
    5_000
}
