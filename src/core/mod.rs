//! Core scheduling abstractions: job model, pools, dispatch loop.

pub mod audit;
pub mod error;
pub mod job;
pub mod job_pool;
pub mod ordered_pool;
pub mod scheduler;
pub mod store;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use error::{AppResult, ConfigError, SchedulerError, StoreError};
pub use job::{by_creation_time, IntegrationJob, JobKey, JobNode, JobState, JobStatus};
pub use job_pool::JobPool;
pub use ordered_pool::{Comparator, OrderedPool, PoolNode};
pub use scheduler::{
    AdmissionLimit, DispatchReport, Dispatcher, Scheduler, SharedAuditSink, Spawn,
};
pub use store::{ConfigResource, ConfigStore, JobEvent, JobExecutor, JobStore};
