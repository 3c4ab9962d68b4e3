//! Job reconcile entrypoint.
//!
//! Every create, update or delete of a job only needs to request a dispatch
//! pass; the pass itself relists the store, so the event payload is used for
//! logging alone.

use std::sync::Arc;
use std::time::Duration;

use crate::core::{JobEvent, JobStore, Scheduler};

/// Turns job store events into schedule requests.
pub struct JobReconciler<S> {
    store: Arc<S>,
    scheduler: Scheduler,
    retry: Duration,
}

impl<S: JobStore> JobReconciler<S> {
    /// Create a reconciler. `retry` is the pause before a dropped or failed
    /// watch is opened again.
    pub const fn new(store: Arc<S>, scheduler: Scheduler, retry: Duration) -> Self {
        Self {
            store,
            scheduler,
            retry,
        }
    }

    /// React to one job event.
    pub fn reconcile(&self, event: &JobEvent) {
        match event {
            JobEvent::Applied(job) => {
                tracing::debug!(job = %job.key, state = %job.state(), "job applied");
            }
            JobEvent::Deleted(key) => tracing::debug!(job = %key, "job deleted"),
        }
        self.scheduler.schedule();
    }

    /// Watch the job store for process lifetime, reopening the watch after a
    /// drop or failure. A pass is requested on every (re)open so changes
    /// missed while disconnected are picked up.
    pub async fn run(self) {
        loop {
            match self.store.watch().await {
                Ok(mut events) => {
                    tracing::debug!("job watch opened");
                    self.scheduler.schedule();
                    while let Some(event) = events.recv().await {
                        self.reconcile(&event);
                    }
                    tracing::info!("job watch closed, reopening");
                }
                Err(e) => tracing::warn!("failed to open job watch: {e}"),
            }
            tokio::time::sleep(self.retry).await;
        }
    }
}
