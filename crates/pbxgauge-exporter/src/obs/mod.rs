//! Gauge registry and Prometheus text rendering.
//!
//! The registry is the only state shared between the refresh loop and the
//! `/metrics` handler. Values live in atomics so a scrape never sees a torn
//! number; there is no registry-wide lock, so a scrape taken mid-cycle may mix
//! values from two cycles across families.

pub mod registry;
pub mod render;

pub use registry::{FamilySnapshot, GaugeCell, GlobalSample, MetricRegistry, RegistryBuilder, RegistrySnapshot, Sample};
pub use render::{render_text, TEXT_CONTENT_TYPE};
