//! Metric sources: where refresh cycles get their rows from.
//!
//! A source opens one session per refresh cycle. Sessions run the fixed
//! catalogue queries and hand back `(domain, value)` rows; they never touch
//! the registry and never stop the process themselves.

pub mod postgres;
pub mod queries;

use async_trait::async_trait;

use pbxgauge_core::error::Result;
use pbxgauge_core::DomainFamily;

pub use postgres::PgSource;

/// One result row. `value` is `None` when the aggregate was SQL NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub label: String,
    pub value: Option<f64>,
}

impl SourceRow {
    pub fn new(label: impl Into<String>, value: Option<f64>) -> Self {
        Self { label: label.into(), value }
    }
}

/// Opens sessions against the backing store.
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn open(&self) -> Result<Box<dyn SourceSession>>;
}

/// A live session. Dropping it releases the underlying connection.
#[async_trait]
pub trait SourceSession: Send {
    async fn domain_count(&mut self) -> Result<f64>;
    async fn family_rows(&mut self, family: DomainFamily) -> Result<Vec<SourceRow>>;
}
