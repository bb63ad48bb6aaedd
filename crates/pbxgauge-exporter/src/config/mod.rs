//! Exporter config loader (strict parsing) and CLI overlay.

pub mod schema;

use std::fs;
use std::path::Path;

use pbxgauge_core::error::{ExporterError, Result};

use crate::cli::Cli;

pub use schema::{DatabaseSection, ExporterConfig, ExporterSection, RefreshSection};

pub fn load_from_file(path: &Path) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ExporterError::Config(format!("read {} failed: {e}", path.display())))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| ExporterError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Defaults, then the optional `--config` file, then individual flags.
pub fn resolve(cli: &Cli) -> Result<ExporterConfig> {
    let mut cfg = match &cli.config {
        Some(path) => load_from_file(path)?,
        None => ExporterConfig::default(),
    };
    cli.apply(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}
