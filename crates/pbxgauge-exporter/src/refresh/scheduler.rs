//! Refresh loop.
//!
//! Runs on its own task. Cycles never overlap: the next one starts `interval`
//! after the previous one ended, so a slow cycle delays the schedule instead
//! of stacking up behind it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::Instrument;

use pbxgauge_core::error::Result;
use pbxgauge_core::FailurePolicy;

use crate::config::RefreshSection;
use crate::obs::MetricRegistry;
use crate::refresh::cycle::run_cycle;
use crate::source::MetricSource;

pub struct Scheduler {
    registry: Arc<MetricRegistry>,
    source: Arc<dyn MetricSource>,
    interval: Duration,
    policy: FailurePolicy,
}

impl Scheduler {
    pub fn new(registry: Arc<MetricRegistry>, source: Arc<dyn MetricSource>, interval: Duration, policy: FailurePolicy) -> Self {
        Self { registry, source, interval, policy }
    }

    pub fn from_config(registry: Arc<MetricRegistry>, source: Arc<dyn MetricSource>, cfg: &RefreshSection) -> Self {
        Self::new(registry, source, Duration::from_millis(cfg.interval_ms), cfg.on_error)
    }

    /// Loop until `shutdown` flips (or its sender is dropped).
    ///
    /// Returns `Err` when a cycle fails with a fatal error, or with any error
    /// under `FailurePolicy::Exit`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            on_error = self.policy.as_str(),
            "refresh loop started"
        );

        let mut cycle: u64 = 0;
        loop {
            if *shutdown.borrow() {
                break;
            }
            cycle += 1;

            // A family's reset and its observes have no await between them, so
            // abandoning the cycle here never leaves a family half-written.
            let span = tracing::info_span!("refresh", cycle);
            let outcome = tokio::select! {
                res = run_cycle(cycle, &self.registry, self.source.as_ref()).instrument(span) => res,
                _ = shutdown.changed() => {
                    tracing::info!(cycle, "shutdown during refresh; abandoning cycle");
                    break;
                }
            };

            match outcome {
                Ok(report) => {
                    tracing::info!(
                        cycle,
                        domains = report.domains,
                        rows = report.rows,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        "refresh complete"
                    );
                }
                Err(e) if e.is_fatal() || self.policy == FailurePolicy::Exit => {
                    tracing::error!(cycle, kind = e.kind().as_str(), error = %e, "refresh failed; stopping");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(cycle, kind = e.kind().as_str(), error = %e, "refresh failed; keeping last values");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        tracing::info!("refresh loop stopped");
        Ok(())
    }
}
