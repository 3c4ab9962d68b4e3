//! Error types for scheduler and config-dispatch operations.

use thiserror::Error;

use crate::core::job::JobKey;

/// Failures talking to an external store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The named resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A concurrent write won.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The watch stream was closed by the store.
    #[error("watch closed")]
    Closed,
}

/// Errors produced by the admission scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Reading or writing the job store failed.
    #[error("job store error: {0}")]
    Store(#[from] StoreError),
    /// The executor refused to start a promoted job.
    #[error("failed to start {job}: {reason}")]
    Execution {
        /// Job that could not be started.
        job: JobKey,
        /// Executor-supplied reason.
        reason: String,
    },
    /// Scheduler configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors produced while applying declarative configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A registered config resource is absent at startup.
    #[error("config resource `{0}` not found")]
    MissingResource(String),
    /// Fields were applied but violate a cross-field rule.
    #[error("invalid config: {0}")]
    Validation(String),
    /// Reading the config store failed.
    #[error("config store error: {0}")]
    Store(#[from] StoreError),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
