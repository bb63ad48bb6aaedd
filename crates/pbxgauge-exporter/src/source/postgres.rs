//! PostgreSQL source backed by `tokio-postgres`.
//!
//! Every `open` makes a new connection and the session owns it; the refresh
//! loop drops the session at the end of the cycle, which closes the socket.
//! No pool is kept between cycles. Connect and each query run under their
//! own deadline so a hung database cannot stall the loop forever.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tokio_postgres::{Client, NoTls, Row};

use pbxgauge_core::error::{ExporterError, Result};
use pbxgauge_core::{DomainFamily, GlobalMetric};

use crate::config::{DatabaseSection, RefreshSection};
use crate::source::{queries, MetricSource, SourceRow, SourceSession};

pub struct PgSource {
    pg: tokio_postgres::Config,
    connect_timeout: Duration,
    query_timeout: Duration,
}

impl PgSource {
    pub fn new(db: &DatabaseSection, refresh: &RefreshSection) -> Self {
        let mut pg = tokio_postgres::Config::new();
        pg.user(&db.user)
            .password(db.password.as_bytes())
            .dbname(&db.dbname)
            .host(&db.host)
            .port(db.port);

        Self {
            pg,
            connect_timeout: Duration::from_millis(refresh.connect_timeout_ms),
            query_timeout: Duration::from_millis(refresh.query_timeout_ms),
        }
    }
}

#[async_trait]
impl MetricSource for PgSource {
    async fn open(&self) -> Result<Box<dyn SourceSession>> {
        let (client, connection) = timeout(self.connect_timeout, self.pg.connect(NoTls))
            .await
            .map_err(|_| ExporterError::Timeout {
                what: "connect",
                after_ms: self.connect_timeout.as_millis() as u64,
            })?
            .map_err(|e| ExporterError::Connection(e.to_string()))?;

        // The connection future drives the socket; it resolves once the client is dropped.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "postgres connection closed with error");
            }
        });

        tracing::debug!("postgres session opened");
        Ok(Box::new(PgSession { client, query_timeout: self.query_timeout }))
    }
}

struct PgSession {
    client: Client,
    query_timeout: Duration,
}

impl PgSession {
    async fn query(&self, what: &'static str, sql: &str) -> Result<Vec<Row>> {
        timeout(self.query_timeout, self.client.query(sql, &[]))
            .await
            .map_err(|_| ExporterError::Timeout {
                what,
                after_ms: self.query_timeout.as_millis() as u64,
            })?
            .map_err(|e| ExporterError::Query { family: what, msg: e.to_string() })
    }
}

fn scan_row(family: &'static str, row: &Row) -> Result<SourceRow> {
    let label: Option<String> = row
        .try_get(0)
        .map_err(|e| ExporterError::Scan { family, msg: e.to_string() })?;
    let value: Option<f64> = row
        .try_get(1)
        .map_err(|e| ExporterError::Scan { family, msg: e.to_string() })?;
    row_from_columns(family, label, value)
}

/// Shape check for a scanned `(domain_name, value)` pair. A NULL domain has
/// nowhere to go in the registry; a NULL value is kept for the caller.
pub fn row_from_columns(family: &'static str, label: Option<String>, value: Option<f64>) -> Result<SourceRow> {
    let label = label.ok_or_else(|| ExporterError::Scan {
        family,
        msg: "domain_name is NULL".into(),
    })?;
    Ok(SourceRow { label, value })
}

#[async_trait]
impl SourceSession for PgSession {
    async fn domain_count(&mut self) -> Result<f64> {
        let what = GlobalMetric::DomainsCount.name();
        let rows = self.query(what, queries::DOMAIN_COUNT).await?;
        let row = rows.first().ok_or_else(|| ExporterError::Scan {
            family: what,
            msg: "no rows".into(),
        })?;
        let count: Option<f64> = row
            .try_get(0)
            .map_err(|e| ExporterError::Scan { family: what, msg: e.to_string() })?;
        Ok(count.unwrap_or(0.0))
    }

    async fn family_rows(&mut self, family: DomainFamily) -> Result<Vec<SourceRow>> {
        let rows = self.query(family.name(), &queries::family_sql(family)).await?;
        rows.iter().map(|row| scan_row(family.name(), row)).collect()
    }
}
