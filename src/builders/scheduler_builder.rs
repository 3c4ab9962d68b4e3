//! Builders to construct the scheduler and config watcher from configuration.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{ConfigWatcher, ControllerSettings, EmailTemplates, SchedulerConfig};
use crate::core::{
    AdmissionLimit, ConfigStore, InMemoryAuditSink, JobExecutor, JobStore, Scheduler, SchedulerError,
    Spawn,
};

/// Build the scheduler, attach an audit sink sized from `cfg`, and spawn its
/// dispatch loop on `spawner`.
///
/// The audit sink is returned so callers can inspect the dispatch trail.
///
/// # Errors
///
/// [`SchedulerError::InvalidConfig`] if `cfg` fails validation.
pub fn build_scheduler<S, E, Sp>(
    cfg: &SchedulerConfig,
    store: Arc<S>,
    executor: Arc<E>,
    limit: Arc<dyn AdmissionLimit>,
    spawner: &Sp,
) -> Result<(Scheduler, Arc<Mutex<InMemoryAuditSink>>), SchedulerError>
where
    S: JobStore,
    E: JobExecutor,
    Sp: Spawn,
{
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;

    let audit = Arc::new(Mutex::new(InMemoryAuditSink::new(cfg.audit_capacity)));
    let (scheduler, dispatcher) = Scheduler::new(store, executor, limit, cfg.cooldown());
    spawner.spawn(dispatcher.with_audit(audit.clone()).run());
    tracing::info!(
        namespace = %cfg.namespace,
        cooldown_ms = cfg.cooldown_ms,
        "scheduler started"
    );
    Ok((scheduler, audit))
}

/// Build a config watcher with the controller settings and email template
/// handlers registered under the names from `cfg`.
///
/// # Errors
///
/// [`SchedulerError::InvalidConfig`] if `cfg` fails validation or both
/// handlers are configured for the same resource name.
pub fn build_config_watcher<S: ConfigStore>(
    cfg: &SchedulerConfig,
    store: Arc<S>,
    settings: Arc<ControllerSettings>,
    templates: Arc<EmailTemplates>,
) -> Result<ConfigWatcher<S>, SchedulerError> {
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;
    if cfg.controller_config_name == cfg.email_template_name {
        return Err(SchedulerError::InvalidConfig(format!(
            "controller config and email templates share the resource name `{}`",
            cfg.controller_config_name
        )));
    }

    Ok(ConfigWatcher::new(store, cfg.watch_retry())
        .with_handler(cfg.controller_config_name.clone(), settings)
        .with_handler(cfg.email_template_name.clone(), templates))
}
