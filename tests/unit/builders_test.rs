//! Tests for builder modules

use async_trait::async_trait;
use cicd_scheduler::builders::{build_config_watcher, build_scheduler};
use cicd_scheduler::config::{ControllerSettings, EmailTemplates, SchedulerConfig};
use cicd_scheduler::core::{IntegrationJob, JobExecutor, SchedulerError};
use cicd_scheduler::infra::{InMemoryConfigStore, InMemoryJobStore};
use cicd_scheduler::runtime::TokioSpawner;
use std::sync::Arc;

struct NoopExecutor;

#[async_trait]
impl JobExecutor for NoopExecutor {
    async fn start(&self, _job: &IntegrationJob) -> Result<(), String> {
        Ok(())
    }
}

#[tokio::test]
async fn test_build_scheduler_rejects_invalid_config() {
    let config = SchedulerConfig {
        watch_retry_ms: 0,
        ..SchedulerConfig::default()
    };

    let result = build_scheduler(
        &config,
        Arc::new(InMemoryJobStore::new()),
        Arc::new(NoopExecutor),
        Arc::new(1_usize),
        &TokioSpawner::current(),
    );
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_build_scheduler_sizes_audit_sink() {
    let config = SchedulerConfig {
        audit_capacity: 4,
        ..SchedulerConfig::default()
    };

    let (scheduler, audit) = build_scheduler(
        &config,
        Arc::new(InMemoryJobStore::new()),
        Arc::new(NoopExecutor),
        Arc::new(1_usize),
        &TokioSpawner::current(),
    )
    .unwrap();
    assert!(scheduler.schedule());
    assert!(audit.lock().events().is_empty());
}

#[test]
fn test_build_config_watcher_rejects_shared_names() {
    let config = SchedulerConfig {
        email_template_name: "cicd-config".to_string(),
        ..SchedulerConfig::default()
    };

    let result = build_config_watcher(
        &config,
        Arc::new(InMemoryConfigStore::new()),
        Arc::new(ControllerSettings::new()),
        Arc::new(EmailTemplates::new()),
    );
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}
