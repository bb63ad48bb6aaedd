//! One refresh transaction.
//!
//! For each family, rows are fetched and validated before the family is
//! reset, so a failed query leaves that family at its last-good values.
//! Within a family, `reset` always precedes the `observe` calls, and all of
//! them finish before the next family starts. There is no await point between
//! a family's reset and its last observe.

use std::time::{Duration, Instant};

use pbxgauge_core::error::{ExporterError, Result};
use pbxgauge_core::{DomainFamily, GlobalMetric};

use crate::obs::MetricRegistry;
use crate::source::{MetricSource, SourceRow};

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub domains: f64,
    pub families: usize,
    pub rows: usize,
    pub elapsed: Duration,
}

/// SQL NULL means "no data", which the exporter reports as 0.
fn coerce(family: DomainFamily, rows: Vec<SourceRow>) -> Result<Vec<(String, f64)>> {
    rows.into_iter()
        .map(|row| {
            let value = row.value.unwrap_or(0.0);
            if !value.is_finite() {
                return Err(ExporterError::InvalidValue {
                    metric: family.name(),
                    label: row.label,
                    value,
                });
            }
            Ok((row.label, value))
        })
        .collect()
}

pub async fn run_cycle(cycle: u64, registry: &MetricRegistry, source: &dyn MetricSource) -> Result<CycleReport> {
    let started = Instant::now();
    let mut session = source.open().await?;

    let domains = session.domain_count().await?;
    registry.global_set(GlobalMetric::DomainsCount, domains)?;

    let mut rows_total = 0;
    for family in DomainFamily::ALL {
        let rows = session.family_rows(family).await?;
        let values = coerce(family, rows)?;

        registry.reset(family)?;
        for (label, value) in &values {
            registry.observe(family, label, *value)?;
        }

        tracing::debug!(family = family.name(), rows = values.len(), "family refreshed");
        rows_total += values.len();
    }

    drop(session);

    Ok(CycleReport {
        cycle,
        domains,
        families: DomainFamily::ALL.len(),
        rows: rows_total,
        elapsed: started.elapsed(),
    })
}
