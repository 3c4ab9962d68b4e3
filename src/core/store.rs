//! External collaborators: job store, config store and executor.
//!
//! The scheduler never owns job or config state. It reads and writes through
//! these traits, and hands admitted jobs to a [`JobExecutor`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::core::error::StoreError;
use crate::core::job::{IntegrationJob, JobKey, JobState};

/// Change notification from the job store.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// A job was created or updated.
    Applied(IntegrationJob),
    /// A job was deleted.
    Deleted(JobKey),
}

/// Authoritative store of integration jobs.
#[async_trait]
pub trait JobStore: Send + Sync + 'static {
    /// List every job currently stored.
    async fn list(&self) -> Result<Vec<IntegrationJob>, StoreError>;

    /// Write a new lifecycle state (and optional reason) for a job and return
    /// the stored copy. Writing the state a job already has is not an error.
    async fn update_state(
        &self,
        key: &JobKey,
        state: JobState,
        message: Option<String>,
    ) -> Result<IntegrationJob, StoreError>;

    /// Open a watch. Delivery is at-least-once; the stream ends when the
    /// connection drops.
    async fn watch(&self) -> Result<mpsc::Receiver<JobEvent>, StoreError>;
}

/// Starts execution of admitted jobs.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use cicd_scheduler::core::{IntegrationJob, JobExecutor};
///
/// struct PipelineRunner;
///
/// #[async_trait]
/// impl JobExecutor for PipelineRunner {
///     async fn start(&self, job: &IntegrationJob) -> Result<(), String> {
///         // create the pipeline run for `job`
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait JobExecutor: Send + Sync + 'static {
    /// Begin executing `job`. Returns the reason on refusal.
    async fn start(&self, job: &IntegrationJob) -> Result<(), String>;
}

/// A named key/value configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResource {
    /// Resource name.
    pub name: String,
    /// Opaque token that changes on every write.
    pub resource_version: String,
    /// Flat string data.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// Store of declarative config resources.
#[async_trait]
pub trait ConfigStore: Send + Sync + 'static {
    /// Fetch a resource by name, `None` if absent.
    async fn get(&self, name: &str) -> Result<Option<ConfigResource>, StoreError>;

    /// Open a watch over all resources. Delivery is at-least-once; the
    /// stream ends when the connection drops.
    async fn watch(&self) -> Result<mpsc::Receiver<ConfigResource>, StoreError>;
}
