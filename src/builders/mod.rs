//! Builders wiring the scheduler components together.

pub mod scheduler_builder;

pub use scheduler_builder::{build_config_watcher, build_scheduler};
