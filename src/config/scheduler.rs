//! Static scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::controller::{CONTROLLER_CONFIG_NAME, EMAIL_TEMPLATE_NAME};

const ENV_COOLDOWN_MS: &str = "CICD_COOLDOWN_MS";
const ENV_NAMESPACE: &str = "CICD_NAMESPACE";
const ENV_CONFIG_NAME: &str = "CICD_CONFIG_NAME";
const ENV_EMAIL_TEMPLATE_NAME: &str = "CICD_EMAIL_TEMPLATE_NAME";
const ENV_WATCH_RETRY_MS: &str = "CICD_WATCH_RETRY_MS";
const ENV_AUDIT_CAPACITY: &str = "CICD_AUDIT_CAPACITY";

/// Scheduler and watcher configuration fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Minimum gap between two dispatch passes, in milliseconds.
    pub cooldown_ms: u64,
    /// Namespace holding the config resources.
    pub namespace: String,
    /// Name of the controller config resource.
    pub controller_config_name: String,
    /// Name of the email template resource.
    pub email_template_name: String,
    /// Pause before reopening a dropped watch, in milliseconds.
    pub watch_retry_ms: u64,
    /// Number of audit events kept in memory.
    pub audit_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 3_000,
            namespace: "cicd-system".into(),
            controller_config_name: CONTROLLER_CONFIG_NAME.into(),
            email_template_name: EMAIL_TEMPLATE_NAME.into(),
            watch_retry_ms: 1_000,
            audit_capacity: 256,
        }
    }
}

impl SchedulerConfig {
    /// Minimum gap between dispatch passes.
    pub const fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Pause before reopening a watch.
    pub const fn watch_retry(&self) -> Duration {
        Duration::from_millis(self.watch_retry_ms)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Describes the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.cooldown_ms == 0 {
            return Err("cooldown_ms must be greater than 0".into());
        }
        if self.watch_retry_ms == 0 {
            return Err("watch_retry_ms must be greater than 0".into());
        }
        if self.audit_capacity == 0 {
            return Err("audit_capacity must be greater than 0".into());
        }
        for (field, value) in [
            ("namespace", &self.namespace),
            ("controller_config_name", &self.controller_config_name),
            ("email_template_name", &self.email_template_name),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate. Missing fields
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// Parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `CICD_*` environment variables, loading a
    /// `.env` file first if one exists. Unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Unparsable numeric variables or validation failure.
    pub fn from_env() -> Result<Self, String> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        fn number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, String> {
            raw.trim()
                .parse()
                .map_err(|_| format!("{key} must be a non-negative integer, got `{raw}`"))
        }

        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_COOLDOWN_MS) {
            cfg.cooldown_ms = number(ENV_COOLDOWN_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_WATCH_RETRY_MS) {
            cfg.watch_retry_ms = number(ENV_WATCH_RETRY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_AUDIT_CAPACITY) {
            cfg.audit_capacity = number(ENV_AUDIT_CAPACITY, &raw)?;
        }
        if let Some(ns) = lookup(ENV_NAMESPACE) {
            cfg.namespace = ns;
        }
        if let Some(name) = lookup(ENV_CONFIG_NAME) {
            cfg.controller_config_name = name;
        }
        if let Some(name) = lookup(ENV_EMAIL_TEMPLATE_NAME) {
            cfg.email_template_name = name;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
