//! Periodic refresh: query the source, write the registry, sleep, repeat.

pub mod cycle;
pub mod scheduler;

pub use cycle::{run_cycle, CycleReport};
pub use scheduler::Scheduler;
