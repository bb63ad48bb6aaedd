//! pbxgauge exporter library entry.
//!
//! This crate wires the gauge registry, the PostgreSQL metric source, the
//! refresh loop, and the `/metrics` endpoint together. It is consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod cli;
pub mod config;
pub mod obs;
pub mod ops;
pub mod refresh;
pub mod router;
pub mod source;
