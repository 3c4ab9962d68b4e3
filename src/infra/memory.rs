//! In-memory job and config stores for development and testing.
//!
//! Both stores fan every write out to open watch streams. A watcher whose
//! buffer is full misses the event; readers are expected to resync, as they
//! would against a real cluster API.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::core::error::StoreError;
use crate::core::job::{IntegrationJob, JobKey, JobState};
use crate::core::store::{ConfigResource, ConfigStore, JobEvent, JobStore};
use crate::util::clock::now_ms;

/// Buffer size of each watch stream.
pub const WATCH_BUFFER: usize = 256;

fn fan_out<T: Clone>(watchers: &Mutex<Vec<mpsc::Sender<T>>>, event: &T) {
    watchers.lock().retain(|tx| match tx.try_send(event.clone()) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::warn!("watch buffer full, event dropped");
            true
        }
        Err(TrySendError::Closed(_)) => false,
    });
}

/// In-memory [`JobStore`].
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<BTreeMap<JobKey, IntegrationJob>>,
    watchers: Mutex<Vec<mpsc::Sender<JobEvent>>>,
    fail_list: AtomicBool,
    fail_updates: AtomicBool,
}

impl InMemoryJobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a job and notify watchers.
    pub fn upsert(&self, job: IntegrationJob) {
        self.jobs.lock().insert(job.key.clone(), job.clone());
        fan_out(&self.watchers, &JobEvent::Applied(job));
    }

    /// Delete a job and notify watchers. Missing keys are ignored.
    pub fn delete(&self, key: &JobKey) {
        if self.jobs.lock().remove(key).is_some() {
            fan_out(&self.watchers, &JobEvent::Deleted(key.clone()));
        }
    }

    /// Current copy of a job.
    pub fn get(&self, key: &JobKey) -> Option<IntegrationJob> {
        self.jobs.lock().get(key).cloned()
    }

    /// Make subsequent `list` calls fail.
    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::Release);
    }

    /// Make subsequent `update_state` calls fail.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::Release);
    }

    /// Drop every open watch stream, as a lost connection would.
    pub fn close_watches(&self) {
        self.watchers.lock().clear();
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn list(&self) -> Result<Vec<IntegrationJob>, StoreError> {
        if self.fail_list.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("list failed".into()));
        }
        Ok(self.jobs.lock().values().cloned().collect())
    }

    async fn update_state(
        &self,
        key: &JobKey,
        state: JobState,
        message: Option<String>,
    ) -> Result<IntegrationJob, StoreError> {
        if self.fail_updates.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable(format!("update of {key} failed")));
        }
        let updated = {
            let mut jobs = self.jobs.lock();
            let job = jobs
                .get_mut(key)
                .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
            job.status.state = state;
            job.status.message = message;
            let now = now_ms();
            if state == JobState::Running && job.status.start_time_ms.is_none() {
                job.status.start_time_ms = Some(now);
            }
            if state.is_terminal() && job.status.completion_time_ms.is_none() {
                job.status.completion_time_ms = Some(now);
            }
            job.clone()
        };
        fan_out(&self.watchers, &JobEvent::Applied(updated.clone()));
        Ok(updated)
    }

    async fn watch(&self) -> Result<mpsc::Receiver<JobEvent>, StoreError> {
        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        self.watchers.lock().push(tx);
        Ok(rx)
    }
}

/// In-memory [`ConfigStore`] with a store-wide version counter.
#[derive(Default)]
pub struct InMemoryConfigStore {
    resources: Mutex<HashMap<String, ConfigResource>>,
    watchers: Mutex<Vec<mpsc::Sender<ConfigResource>>>,
    version: AtomicU64,
    fail_watch: AtomicBool,
}

impl InMemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `data` to the named resource under a fresh version and notify
    /// watchers.
    pub fn apply<I, K, V>(&self, name: &str, data: I) -> ConfigResource
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        let resource = ConfigResource {
            name: name.to_string(),
            resource_version: version.to_string(),
            data: data
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        };
        self.resources
            .lock()
            .insert(name.to_string(), resource.clone());
        fan_out(&self.watchers, &resource);
        resource
    }

    /// Send the stored copy again without changing its version.
    pub fn redeliver(&self, name: &str) {
        let resource = self.resources.lock().get(name).cloned();
        if let Some(resource) = resource {
            fan_out(&self.watchers, &resource);
        }
    }

    /// Make subsequent `watch` calls fail.
    pub fn fail_watch(&self, fail: bool) {
        self.fail_watch.store(fail, Ordering::Release);
    }

    /// Drop every open watch stream, as a lost connection would.
    pub fn close_watches(&self) {
        self.watchers.lock().clear();
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get(&self, name: &str) -> Result<Option<ConfigResource>, StoreError> {
        Ok(self.resources.lock().get(name).cloned())
    }

    async fn watch(&self) -> Result<mpsc::Receiver<ConfigResource>, StoreError> {
        if self.fail_watch.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("watch failed".into()));
        }
        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        self.watchers.lock().push(tx);
        Ok(rx)
    }
}
