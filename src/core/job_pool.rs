//! Pending and running pools for integration jobs.

use crate::core::job::{by_creation_time, IntegrationJob, JobKey, JobNode, JobState};
use crate::core::ordered_pool::OrderedPool;
use crate::util::signal::Signal;

/// Pending and running pools kept disjoint.
///
/// [`JobPool::sync_job`] is the only way membership changes. A job is held
/// by at most one of the two pools at a time; terminal jobs are held by
/// neither.
pub struct JobPool {
    pending: OrderedPool<JobNode>,
    running: OrderedPool<JobNode>,
    on_change: Signal,
}

impl JobPool {
    /// Create empty pools. `on_change` is notified whenever a sync changes
    /// either pool.
    pub fn new(on_change: Signal) -> Self {
        Self {
            pending: OrderedPool::new(by_creation_time),
            running: OrderedPool::new(by_creation_time),
            on_change,
        }
    }

    /// Place `job` according to its state.
    pub fn sync_job(&mut self, job: &IntegrationJob) {
        let node = JobNode::from(job);
        let changed = match job.state() {
            JobState::Pending => {
                let moved = self.running.remove(&node.key).is_some();
                self.pending.sync(node) || moved
            }
            JobState::Running => {
                let moved = self.pending.remove(&node.key).is_some();
                self.running.sync(node) || moved
            }
            state => {
                debug_assert!(state.is_terminal());
                self.forget(&job.key)
            }
        };

        if changed {
            tracing::debug!(
                job = %job.key,
                state = %job.state(),
                pending = self.pending.len(),
                running = self.running.len(),
                "job pool changed"
            );
            self.on_change.notify();
        }
    }

    /// Drop a job that no longer exists in the store.
    pub fn sync_deleted(&mut self, key: &JobKey) {
        if self.forget(key) {
            tracing::debug!(job = %key, "deleted job left the pool");
            self.on_change.notify();
        }
    }

    fn forget(&mut self, key: &JobKey) -> bool {
        let was_pending = self.pending.remove(key).is_some();
        let was_running = self.running.remove(key).is_some();
        was_pending || was_running
    }

    /// Jobs waiting for admission, oldest first.
    pub const fn pending(&self) -> &OrderedPool<JobNode> {
        &self.pending
    }

    /// Jobs currently admitted, oldest first.
    pub const fn running(&self) -> &OrderedPool<JobNode> {
        &self.running
    }

    /// Next job to admit.
    pub fn next_pending(&self) -> Option<&JobNode> {
        self.pending.front()
    }

    /// Keys currently held in either pool.
    pub fn keys(&self) -> impl Iterator<Item = &JobKey> {
        self.pending.iter().chain(self.running.iter()).map(|n| &n.key)
    }
}
