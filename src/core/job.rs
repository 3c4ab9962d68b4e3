//! Integration job model: identity, lifecycle state and pool nodes.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::ordered_pool::PoolNode;

/// Composite identity of an integration job.
///
/// Ordering compares the `namespace/name` text byte by byte, which gives the
/// deterministic tie-break used when two jobs share a creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    /// Namespace the job lives in.
    pub namespace: String,
    /// Name of the job, unique within its namespace.
    pub name: String,
}

impl JobKey {
    /// Build a key from namespace and name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl Ord for JobKey {
    fn cmp(&self, other: &Self) -> Ordering {
        fn text(key: &JobKey) -> impl Iterator<Item = u8> + '_ {
            key.namespace
                .bytes()
                .chain(std::iter::once(b'/'))
                .chain(key.name.bytes())
        }
        // Namespaces containing '/' can render identically; fall back to the
        // fields so the order stays consistent with `Eq`.
        text(self)
            .cmp(text(other))
            .then_with(|| self.namespace.cmp(&other.namespace))
    }
}

impl PartialOrd for JobKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Lifecycle state of an integration job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    /// Waiting for admission.
    #[default]
    Pending,
    /// Admitted and handed to the executor.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Stopped before completion.
    Canceled,
}

impl JobState {
    /// Terminal states are never scheduled again.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
        };
        f.write_str(s)
    }
}

/// Observed status of a job as written to the job store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Current lifecycle state.
    pub state: JobState,
    /// Human-readable reason for the last transition.
    pub message: Option<String>,
    /// When the job was admitted (ms since epoch).
    pub start_time_ms: Option<u128>,
    /// When the job reached a terminal state (ms since epoch).
    pub completion_time_ms: Option<u128>,
}

/// A schedulable integration job.
///
/// The job store owns the authoritative copy; the scheduler only ever holds
/// [`JobNode`]s derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationJob {
    /// Namespace and name.
    pub key: JobKey,
    /// Creation timestamp in milliseconds since epoch.
    pub created_at_ms: u128,
    /// Opaque spec forwarded to the executor.
    #[serde(default)]
    pub spec: serde_json::Value,
    /// Observed status.
    #[serde(default)]
    pub status: JobStatus,
}

impl IntegrationJob {
    /// New pending job with an empty spec.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, created_at_ms: u128) -> Self {
        Self {
            key: JobKey::new(namespace, name),
            created_at_ms,
            spec: serde_json::Value::Null,
            status: JobStatus::default(),
        }
    }

    /// Replace the lifecycle state.
    #[must_use]
    pub fn with_state(mut self, state: JobState) -> Self {
        self.status.state = state;
        self
    }

    /// Replace the spec payload.
    #[must_use]
    pub fn with_spec(mut self, spec: serde_json::Value) -> Self {
        self.spec = spec;
        self
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> JobState {
        self.status.state
    }
}

/// Lightweight pool entry derived from an [`IntegrationJob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobNode {
    /// Identity of the job.
    pub key: JobKey,
    /// Ordering key.
    pub created_at_ms: u128,
}

impl From<&IntegrationJob> for JobNode {
    fn from(job: &IntegrationJob) -> Self {
        Self {
            key: job.key.clone(),
            created_at_ms: job.created_at_ms,
        }
    }
}

impl PoolNode for JobNode {
    type Id = JobKey;

    fn id(&self) -> &JobKey {
        &self.key
    }
}

/// Oldest job first. Equal timestamps are left to the pool's identity
/// tie-break.
pub fn by_creation_time(a: &JobNode, b: &JobNode) -> Ordering {
    a.created_at_ms.cmp(&b.created_at_ms)
}
