//! Shared utilities.

pub mod clock;
pub mod signal;
pub mod telemetry;

pub use clock::now_ms;
pub use signal::{Signal, SignalReceiver};
pub use telemetry::init_tracing;
