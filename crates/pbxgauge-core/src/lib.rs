//! pbxgauge core: error taxonomy and the fixed metric catalogue.
//!
//! This crate defines the contracts shared by the exporter runtime, the
//! metric source, and tests. It carries no transport, database, or runtime
//! dependencies so the catalogue can be reused by other tooling.
//!
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible
//! paths surface as `ExporterError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod family;
pub mod policy;

/// Shared result type.
pub use error::{ErrorKind, ExporterError, Result};
pub use family::{DomainFamily, GlobalMetric, DOMAIN_LABEL, TRAILING_WINDOW_SECS};
pub use policy::FailurePolicy;
