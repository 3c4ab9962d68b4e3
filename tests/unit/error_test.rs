//! Tests for error types

use cicd_scheduler::core::{AppResult, ConfigError, JobKey, SchedulerError, StoreError};

#[test]
fn test_store_error_display() {
    let err = StoreError::Unavailable("connection refused".to_string());
    assert_eq!(format!("{}", err), "store unavailable: connection refused");
    assert_eq!(format!("{}", StoreError::Closed), "watch closed");
}

#[test]
fn test_store_error_converts_into_scheduler_error() {
    let err: SchedulerError = StoreError::Conflict("ci/a".to_string()).into();
    assert!(matches!(err, SchedulerError::Store(StoreError::Conflict(_))));
    assert_eq!(format!("{}", err), "job store error: conflict: ci/a");
}

#[test]
fn test_execution_error_display() {
    let err = SchedulerError::Execution {
        job: JobKey::new("ci", "build-1"),
        reason: "no pipeline template".to_string(),
    };
    assert_eq!(format!("{}", err), "failed to start ci/build-1: no pipeline template");
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::MissingResource("cicd-config".to_string());
    assert_eq!(format!("{}", err), "config resource `cicd-config` not found");

    let err: ConfigError = StoreError::NotFound("cicd-config".to_string()).into();
    assert_eq!(format!("{}", err), "config store error: not found: cicd-config");
}

#[test]
fn test_app_result_carries_domain_errors() {
    fn startup() -> AppResult<()> {
        Err(ConfigError::MissingResource("email-template".to_string()))?;
        Ok(())
    }

    let err = startup().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingResource(name)) if name == "email-template"
    ));
}
