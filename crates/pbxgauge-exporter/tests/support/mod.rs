//! Scripted in-memory metric source shared by refresh and endpoint tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use pbxgauge_core::error::{ExporterError, Result};
use pbxgauge_core::DomainFamily;
use pbxgauge_exporter::source::{MetricSource, SourceRow, SourceSession};

/// What one refresh cycle sees.
#[derive(Debug, Clone, Default)]
pub struct CycleScript {
    pub fail_open: bool,
    pub domains: f64,
    pub rows: HashMap<DomainFamily, Vec<SourceRow>>,
    pub fail_family: Option<DomainFamily>,
    pub hang_family: Option<DomainFamily>,
}

impl CycleScript {
    pub fn new(domains: f64) -> Self {
        Self { domains, ..Self::default() }
    }

    pub fn unreachable() -> Self {
        Self { fail_open: true, ..Self::default() }
    }

    pub fn row(mut self, family: DomainFamily, label: &str, value: Option<f64>) -> Self {
        self.rows.entry(family).or_default().push(SourceRow::new(label, value));
        self
    }

    pub fn failing(mut self, family: DomainFamily) -> Self {
        self.fail_family = Some(family);
        self
    }

    /// The query for `family` never returns, like a stuck database.
    pub fn hanging(mut self, family: DomainFamily) -> Self {
        self.hang_family = Some(family);
        self
    }
}

/// Hands out one script per `open`. Once the scripts run out every open fails.
#[derive(Default)]
pub struct ScriptedSource {
    cycles: Mutex<VecDeque<CycleScript>>,
    opened: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(cycles: impl IntoIterator<Item = CycleScript>) -> Self {
        Self {
            cycles: Mutex::new(cycles.into_iter().collect()),
            opened: AtomicUsize::new(0),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricSource for ScriptedSource {
    async fn open(&self) -> Result<Box<dyn SourceSession>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let next = self.cycles.lock().unwrap().pop_front();
        match next {
            Some(script) if !script.fail_open => Ok(Box::new(ScriptedSession { script })),
            Some(_) => Err(ExporterError::Connection("connection refused".into())),
            None => Err(ExporterError::Connection("script exhausted".into())),
        }
    }
}

struct ScriptedSession {
    script: CycleScript,
}

#[async_trait]
impl SourceSession for ScriptedSession {
    async fn domain_count(&mut self) -> Result<f64> {
        Ok(self.script.domains)
    }

    async fn family_rows(&mut self, family: DomainFamily) -> Result<Vec<SourceRow>> {
        if self.script.hang_family == Some(family) {
            std::future::pending::<()>().await;
        }
        if self.script.fail_family == Some(family) {
            return Err(ExporterError::Query {
                family: family.name(),
                msg: "relation does not exist".into(),
            });
        }
        Ok(self.script.rows.get(&family).cloned().unwrap_or_default())
    }
}
