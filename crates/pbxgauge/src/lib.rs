//! Top-level facade crate for pbxgauge.
//!
//! Re-exports core types and the exporter library so users can depend on a single crate.

pub mod core {
    pub use pbxgauge_core::*;
}

pub mod exporter {
    pub use pbxgauge_exporter::*;
}
