//! Shared application state for the exporter.
//!
//! Holds the resolved config and the gauge registry. The registry `Arc` is
//! also handed to the refresh loop; that is the only channel between the loop
//! and the HTTP side.

use std::sync::Arc;

use pbxgauge_core::error::Result;

use crate::config::ExporterConfig;
use crate::obs::MetricRegistry;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    registry: Arc<MetricRegistry>,
}

struct AppStateInner {
    cfg: ExporterConfig,
}

impl AppState {
    /// Build state with the standard registry.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        let registry = MetricRegistry::standard()?;
        Ok(Self::with_registry(cfg, Arc::new(registry)))
    }

    pub fn with_registry(cfg: ExporterConfig, registry: Arc<MetricRegistry>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg }),
            registry,
        }
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<MetricRegistry> {
        Arc::clone(&self.registry)
    }
}
