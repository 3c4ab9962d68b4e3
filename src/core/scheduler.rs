//! Admission scheduler: coalesced triggers feeding a single dispatch loop.
//!
//! [`Scheduler::schedule`] may be called from any number of places. Requests
//! land in a one-slot [`Signal`], so every request made before the loop picks
//! up the token collapses into one dispatch pass. The loop runs one pass per
//! token and then sleeps for the cooldown, which keeps passes serialized and
//! rate limited.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;

use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::error::{SchedulerError, StoreError};
use crate::core::job::{IntegrationJob, JobKey, JobState};
use crate::core::job_pool::JobPool;
use crate::core::store::{JobExecutor, JobStore};
use crate::util::signal::{Signal, SignalReceiver};

/// Abstraction for spawning background loops on a runtime.
pub trait Spawn {
    /// Spawn a future that runs to completion in the background.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Source of the concurrency cap, read at the start of every pass.
pub trait AdmissionLimit: Send + Sync {
    /// Maximum number of jobs allowed in the running pool.
    fn max_concurrent(&self) -> usize;
}

impl AdmissionLimit for usize {
    fn max_concurrent(&self) -> usize {
        *self
    }
}

/// Shared handle to an audit sink.
pub type SharedAuditSink = Arc<Mutex<dyn AuditSink>>;

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Sequence number of the pass, starting at 1.
    pub pass: u64,
    /// Pending jobs after the pass, in admission order.
    pub pending: Vec<JobKey>,
    /// Running jobs after the pass, oldest first.
    pub running: Vec<JobKey>,
    /// Jobs promoted and started during this pass, in order.
    pub promoted: Vec<JobKey>,
    /// Cap in force for this pass.
    pub max_concurrent: usize,
}

/// Producer-side handle. Cheap to clone.
#[derive(Clone)]
pub struct Scheduler {
    trigger: Signal,
    reports: watch::Receiver<DispatchReport>,
}

impl Scheduler {
    /// Create a scheduler handle and the dispatcher that serves it. The
    /// dispatcher does nothing until [`Dispatcher::run`] is polled.
    pub fn new<S, E>(
        store: Arc<S>,
        executor: Arc<E>,
        limit: Arc<dyn AdmissionLimit>,
        cooldown: Duration,
    ) -> (Self, Dispatcher<S, E>)
    where
        S: JobStore,
        E: JobExecutor,
    {
        let (trigger, trigger_rx) = Signal::channel();
        let (report_tx, report_rx) = watch::channel(DispatchReport::default());
        let dispatcher = Dispatcher {
            store,
            executor,
            limit,
            pool: JobPool::new(trigger.clone()),
            trigger: trigger_rx,
            cooldown,
            audit: None,
            refused: HashMap::new(),
            pass: 0,
            reports: report_tx,
        };
        let scheduler = Self {
            trigger,
            reports: report_rx,
        };
        (scheduler, dispatcher)
    }

    /// Create a scheduler and spawn its dispatch loop.
    pub fn start<S, E, Sp>(
        store: Arc<S>,
        executor: Arc<E>,
        limit: Arc<dyn AdmissionLimit>,
        cooldown: Duration,
        spawner: &Sp,
    ) -> Self
    where
        S: JobStore,
        E: JobExecutor,
        Sp: Spawn,
    {
        let (scheduler, dispatcher) = Self::new(store, executor, limit, cooldown);
        spawner.spawn(dispatcher.run());
        scheduler
    }

    /// Request a dispatch pass.
    ///
    /// Never blocks. Returns `true` if this call queued the pass and `false`
    /// if one was already queued.
    pub fn schedule(&self) -> bool {
        let queued = self.trigger.notify();
        tracing::debug!(queued, "schedule requested");
        queued
    }

    /// Watch the report published after every pass.
    pub fn reports(&self) -> watch::Receiver<DispatchReport> {
        self.reports.clone()
    }
}

/// Consumer side: owns the job pool and runs dispatch passes.
pub struct Dispatcher<S, E> {
    store: Arc<S>,
    executor: Arc<E>,
    limit: Arc<dyn AdmissionLimit>,
    pool: JobPool,
    trigger: SignalReceiver,
    cooldown: Duration,
    audit: Option<SharedAuditSink>,
    /// Refused jobs whose `Failed` write has not landed yet, with the reason.
    refused: HashMap<JobKey, String>,
    pass: u64,
    reports: watch::Sender<DispatchReport>,
}

impl<S, E> Dispatcher<S, E>
where
    S: JobStore,
    E: JobExecutor,
{
    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: SharedAuditSink) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Pools as of the last pass.
    pub const fn pool(&self) -> &JobPool {
        &self.pool
    }

    /// Serve triggers until every [`Scheduler`] handle and the pool's own
    /// change signal are gone. In practice this runs for process lifetime.
    pub async fn run(mut self) {
        tracing::info!(cooldown = ?self.cooldown, "dispatch loop started");
        while self.trigger.recv().await.is_some() {
            if let Err(e) = self.dispatch().await {
                tracing::warn!(pass = self.pass, "dispatch pass abandoned: {e}");
            }
            tokio::time::sleep(self.cooldown).await;
        }
        tracing::info!("dispatch loop stopped");
    }

    /// Run one pass: resync the pools from the store, then promote pending
    /// jobs, oldest first, until the cap is reached.
    ///
    /// # Errors
    ///
    /// Returns the first store failure. Jobs promoted before the failure stay
    /// promoted; the job being promoted when a write fails stays pending. A
    /// refused job whose `Failed` write fails is kept out of the running
    /// count and the write is retried at the start of every later pass.
    pub async fn dispatch(&mut self) -> Result<DispatchReport, SchedulerError> {
        self.pass += 1;
        let pass = self.pass;
        let jobs = self.store.list().await?;
        self.resync(&jobs);
        self.record_refusals().await;

        let max_concurrent = self.limit.max_concurrent();
        tracing::debug!(
            pass,
            max_concurrent,
            pending = self.pool.pending().len(),
            running = self.pool.running().len(),
            "dispatch pass"
        );

        let mut promoted = Vec::new();
        let outcome = self.admit(pass, max_concurrent, &mut promoted).await;

        let report = DispatchReport {
            pass,
            pending: self.pool.pending().iter().map(|n| n.key.clone()).collect(),
            running: self.pool.running().iter().map(|n| n.key.clone()).collect(),
            promoted,
            max_concurrent,
        };
        self.reports.send_replace(report.clone());
        outcome.map(|()| report)
    }

    fn resync(&mut self, jobs: &[IntegrationJob]) {
        let listed: HashMap<&JobKey, &IntegrationJob> = jobs.iter().map(|j| (&j.key, j)).collect();
        let gone: Vec<JobKey> = self
            .pool
            .keys()
            .filter(|k| !listed.contains_key(k))
            .cloned()
            .collect();
        for key in &gone {
            self.pool.sync_deleted(key);
        }
        self.refused.retain(|key, _| listed.contains_key(key));
        for job in jobs {
            if self.refused.contains_key(&job.key) {
                if job.state() == JobState::Running {
                    // Never started, so it holds no slot.
                    self.pool.sync_job(&job.clone().with_state(JobState::Failed));
                    continue;
                }
                self.refused.remove(&job.key);
            }
            self.pool.sync_job(job);
        }
    }

    async fn record_refusals(&mut self) {
        let outstanding: Vec<(JobKey, String)> = self
            .refused
            .iter()
            .map(|(key, reason)| (key.clone(), reason.clone()))
            .collect();
        for (key, reason) in outstanding {
            match self
                .store
                .update_state(&key, JobState::Failed, Some(reason))
                .await
            {
                Ok(failed) => {
                    tracing::info!(job = %key, "refused job marked failed");
                    self.refused.remove(&key);
                    self.pool.sync_job(&failed);
                }
                Err(StoreError::NotFound(_)) => {
                    self.refused.remove(&key);
                }
                Err(e) => tracing::warn!(job = %key, "refused job still not marked failed: {e}"),
            }
        }
    }

    async fn admit(
        &mut self,
        pass: u64,
        max_concurrent: usize,
        promoted: &mut Vec<JobKey>,
    ) -> Result<(), SchedulerError> {
        while self.pool.running().len() < max_concurrent {
            let Some(key) = self.pool.next_pending().map(|n| n.key.clone()) else {
                break;
            };

            let job = self
                .store
                .update_state(&key, JobState::Running, None)
                .await?;
            if job.state() != JobState::Running {
                tracing::warn!(job = %key, state = %job.state(), "store did not accept promotion");
                break;
            }
            self.pool.sync_job(&job);

            match self.executor.start(&job).await {
                Ok(()) => {
                    tracing::info!(pass, job = %key, "job promoted");
                    self.record(pass, &key, AuditAction::Promote, None);
                    promoted.push(key);
                }
                Err(reason) => {
                    let refusal = SchedulerError::Execution {
                        job: key.clone(),
                        reason: reason.clone(),
                    };
                    tracing::error!(pass, "{refusal}");
                    self.record(pass, &key, AuditAction::StartFailed, Some(reason.clone()));
                    match self
                        .store
                        .update_state(&key, JobState::Failed, Some(reason.clone()))
                        .await
                    {
                        Ok(failed) => self.pool.sync_job(&failed),
                        Err(e) => {
                            self.refused.insert(key, reason);
                            self.pool.sync_job(&job.with_state(JobState::Failed));
                            return Err(e.into());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn record(&self, pass: u64, job: &JobKey, action: AuditAction, detail: Option<String>) {
        if let Some(audit) = &self.audit {
            audit
                .lock()
                .record(build_audit_event(pass, job.clone(), action, detail));
        }
    }
}
