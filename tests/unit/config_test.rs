//! Tests for configuration validation

use cicd_scheduler::config::{ControllerSettings, SchedulerConfig};
use cicd_scheduler::core::AdmissionLimit;
use std::collections::BTreeMap;
use std::time::Duration;

fn data(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_scheduler_config_defaults_are_valid() {
    let config = SchedulerConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.cooldown(), Duration::from_secs(3));
    assert_eq!(config.namespace, "cicd-system");
    assert_eq!(config.controller_config_name, "cicd-config");
    assert_eq!(config.email_template_name, "email-template");
}

#[test]
fn test_scheduler_config_invalid_cooldown() {
    let invalid = SchedulerConfig {
        cooldown_ms: 0,
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_invalid_names() {
    let invalid = SchedulerConfig {
        controller_config_name: "  ".to_string(),
        ..SchedulerConfig::default()
    };
    let err = invalid.validate().unwrap_err();
    assert!(err.contains("controller_config_name"));
}

#[test]
fn test_scheduler_config_from_json() {
    let json = r#"{
        "cooldown_ms": 500,
        "namespace": "ci"
    }"#;

    let config = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(config.cooldown_ms, 500);
    assert_eq!(config.namespace, "ci");
    assert_eq!(config.watch_retry_ms, 1_000);
    assert_eq!(config.audit_capacity, 256);
}

#[test]
fn test_scheduler_config_from_json_rejects_invalid() {
    assert!(SchedulerConfig::from_json_str(r#"{ "audit_capacity": 0 }"#).is_err());
    assert!(SchedulerConfig::from_json_str("not json").is_err());
}

#[test]
fn test_controller_settings_defaults() {
    let settings = ControllerSettings::new();
    assert_eq!(settings.max_pipeline_run.get(), 5);
    assert_eq!(settings.max_concurrent(), 5);
    assert!(!settings.enable_mail.get());
    assert_eq!(settings.expose_mode.get(), "Ingress");
    assert_eq!(settings.collect_period.get(), 120);
    assert_eq!(settings.integration_job_ttl.get(), 120);
    assert!(!settings.is_initialized());
}

#[test]
fn test_negative_cap_admits_nothing() {
    let settings = ControllerSettings::new();
    settings
        .apply_change(&data(&[("maxPipelineRun", "-1")]))
        .unwrap();
    assert_eq!(settings.max_pipeline_run.get(), -1);
    assert_eq!(settings.max_concurrent(), 0);
}

#[test]
fn test_mail_requires_smtp_settings() {
    let settings = ControllerSettings::new();
    assert!(settings
        .apply_change(&data(&[("enableMail", "true"), ("smtpUserSecret", "auth")]))
        .is_err());
    assert!(!settings.is_initialized());

    settings
        .apply_change(&data(&[
            ("enableMail", "true"),
            ("smtpHost", "mail:25"),
            ("smtpUserSecret", "auth"),
        ]))
        .unwrap();
    assert!(settings.is_initialized());
}
