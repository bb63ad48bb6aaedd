//! Dynamic per-domain gauge registry.
//!
//! Families and globals are fixed at construction. Label values are not: a
//! cell is created the first time a domain shows up in a query result and is
//! kept for the life of the process. Cells are never evicted, so a domain
//! that disappears reads 0 after the next `reset` instead of vanishing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use pbxgauge_core::error::{ExporterError, Result};
use pbxgauge_core::{DomainFamily, GlobalMetric, DOMAIN_LABEL};

/// One gauge value. Stores `f64` bits so loads and stores are single atomics.
#[derive(Debug, Default)]
pub struct GaugeCell {
    bits: AtomicU64,
}

impl GaugeCell {
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, v: f64) {
        self.bits.store(v.to_bits(), Ordering::Relaxed);
    }
}

struct FamilyCells {
    family: DomainFamily,
    cells: DashMap<String, GaugeCell>,
}

struct GlobalCell {
    metric: GlobalMetric,
    cell: GaugeCell,
}

/// Collects family/global registrations and rejects duplicate names.
#[derive(Default)]
pub struct RegistryBuilder {
    families: Vec<DomainFamily>,
    globals: Vec<GlobalMetric>,
    names: HashMap<&'static str, &'static str>,
}

impl RegistryBuilder {
    fn claim(&mut self, name: &'static str, what: &'static str) -> Result<()> {
        if let Some(prev) = self.names.insert(name, what) {
            return Err(ExporterError::RegistrationConflict(format!(
                "{name} already registered as {prev}"
            )));
        }
        Ok(())
    }

    pub fn family(mut self, family: DomainFamily) -> Result<Self> {
        self.claim(family.name(), "family")?;
        self.families.push(family);
        Ok(self)
    }

    pub fn global(mut self, metric: GlobalMetric) -> Result<Self> {
        self.claim(metric.name(), "global")?;
        self.globals.push(metric);
        Ok(self)
    }

    pub fn build(self) -> MetricRegistry {
        MetricRegistry {
            families: self
                .families
                .into_iter()
                .map(|family| FamilyCells { family, cells: DashMap::new() })
                .collect(),
            globals: self
                .globals
                .into_iter()
                .map(|metric| GlobalCell { metric, cell: GaugeCell::default() })
                .collect(),
        }
    }
}

/// Thread-safe `(family, domain) -> gauge` store.
///
/// The outer family/global lists are immutable after `build`, so lookups need
/// no lock. Each family's label map is a `DashMap`; writers touch one shard at
/// a time and readers never block on a whole-registry lock.
pub struct MetricRegistry {
    families: Vec<FamilyCells>,
    globals: Vec<GlobalCell>,
}

impl MetricRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry with every family in the catalogue plus `domains_count`.
    pub fn standard() -> Result<Self> {
        let mut b = Self::builder();
        for g in GlobalMetric::ALL {
            b = b.global(g)?;
        }
        for f in DomainFamily::ALL {
            b = b.family(f)?;
        }
        Ok(b.build())
    }

    fn cells(&self, family: DomainFamily) -> Result<&FamilyCells> {
        self.families
            .iter()
            .find(|f| f.family == family)
            .ok_or_else(|| ExporterError::UnknownMetric(family.name().to_string()))
    }

    fn global_cell(&self, metric: GlobalMetric) -> Result<&GaugeCell> {
        self.globals
            .iter()
            .find(|g| g.metric == metric)
            .map(|g| &g.cell)
            .ok_or_else(|| ExporterError::UnknownMetric(metric.name().to_string()))
    }

    /// Set every existing cell of `family` to 0. Cells are kept.
    pub fn reset(&self, family: DomainFamily) -> Result<()> {
        let fam = self.cells(family)?;
        for cell in fam.cells.iter() {
            cell.value().set(0.0);
        }
        Ok(())
    }

    /// Set `(family, label)` to `value`, creating the cell on first sight.
    pub fn observe(&self, family: DomainFamily, label: &str, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(ExporterError::InvalidValue {
                metric: family.name(),
                label: label.to_string(),
                value,
            });
        }
        let fam = self.cells(family)?;

        if let Some(cell) = fam.cells.get(label) {
            cell.set(value);
            return Ok(());
        }

        // entry() holds the shard write lock, so two racing observers of a new
        // label still end up with one cell.
        fam.cells
            .entry(label.to_string())
            .or_insert_with(|| {
                tracing::debug!(family = family.name(), %label, "new series");
                GaugeCell::default()
            })
            .set(value);
        Ok(())
    }

    /// Set an unlabelled gauge. Fails if it was never registered.
    pub fn global_set(&self, metric: GlobalMetric, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(ExporterError::InvalidValue {
                metric: metric.name(),
                label: String::new(),
                value,
            });
        }
        self.global_cell(metric)?.set(value);
        Ok(())
    }

    pub fn get(&self, family: DomainFamily, label: &str) -> Option<f64> {
        let fam = self.cells(family).ok()?;
        fam.cells.get(label).map(|c| c.get())
    }

    pub fn global(&self, metric: GlobalMetric) -> Option<f64> {
        self.global_cell(metric).ok().map(GaugeCell::get)
    }

    /// Number of series ever created for `family`.
    pub fn series_count(&self, family: DomainFamily) -> usize {
        self.cells(family).map(|f| f.cells.len()).unwrap_or(0)
    }

    /// Copy out every cell. Each value is read atomically; values from
    /// different cells may come from different refresh cycles.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let families = self
            .families
            .iter()
            .map(|f| {
                let mut samples: Vec<Sample> = f
                    .cells
                    .iter()
                    .map(|r| Sample { label: r.key().clone(), value: r.value().get() })
                    .collect();
                samples.sort_by(|a, b| a.label.cmp(&b.label));
                FamilySnapshot {
                    name: f.family.name(),
                    help: f.family.help(),
                    label_key: DOMAIN_LABEL,
                    samples,
                }
            })
            .collect();

        let globals = self
            .globals
            .iter()
            .map(|g| GlobalSample {
                name: g.metric.name(),
                help: g.metric.help(),
                value: g.cell.get(),
            })
            .collect();

        RegistrySnapshot { families, globals }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct FamilySnapshot {
    pub name: &'static str,
    pub help: &'static str,
    pub label_key: &'static str,
    pub samples: Vec<Sample>,
}

#[derive(Debug, Clone)]
pub struct GlobalSample {
    pub name: &'static str,
    pub help: &'static str,
    pub value: f64,
}

/// Point-in-time copy of the registry, ready to render.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    pub families: Vec<FamilySnapshot>,
    pub globals: Vec<GlobalSample>,
}

impl RegistrySnapshot {
    pub fn family(&self, name: &str) -> Option<&FamilySnapshot> {
        self.families.iter().find(|f| f.name == name)
    }
}
