//! Process-wide controller settings fed by declarative config resources.
//!
//! Two resources are understood: `cicd-config` drives [`ControllerSettings`]
//! and `email-template` drives [`EmailTemplates`]. The watcher serializes
//! handler calls; readers may load values at any time.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::config::settings::{apply_fields, BoolVar, FieldBinding, IntVar, StringVar};
use crate::config::watcher::ConfigHandler;
use crate::core::error::ConfigError;
use crate::core::scheduler::AdmissionLimit;
use crate::util::signal::{Signal, SignalReceiver};

/// Name of the controller config resource.
pub const CONTROLLER_CONFIG_NAME: &str = "cicd-config";
/// Name of the email template resource.
pub const EMAIL_TEMPLATE_NAME: &str = "email-template";

/// Default cap on concurrently running jobs.
pub const DEFAULT_MAX_PIPELINE_RUN: i64 = 5;
const DEFAULT_EXPOSE_MODE: &str = "Ingress";
const DEFAULT_GIT_IMAGE: &str = "docker.io/alpine/git:1.0.30";
const DEFAULT_COLLECT_PERIOD_HOURS: i64 = 120;
const DEFAULT_JOB_TTL_HOURS: i64 = 120;

/// Settings of the controller, bound to `cicd-config`.
pub struct ControllerSettings {
    /// Number of jobs that may run at once.
    pub max_pipeline_run: IntVar,
    /// Whether mail notifications are enabled.
    pub enable_mail: BoolVar,
    /// External hostname of the webhook server.
    pub external_host_name: StringVar,
    /// How the webhook server is exposed (Ingress, LoadBalancer, ClusterIP).
    pub expose_mode: StringVar,
    /// URI template for report page redirection.
    pub report_redirect_uri_template: StringVar,
    /// SMTP server address (host:port).
    pub smtp_host: StringVar,
    /// Name of the basic-auth secret for the SMTP server.
    pub smtp_user_secret: StringVar,
    /// Garbage collection period, in hours.
    pub collect_period: IntVar,
    /// Age after completion at which jobs are collected, in hours.
    pub integration_job_ttl: IntVar,
    /// Ingress class for the webhook ingress.
    pub ingress_class: StringVar,
    /// Host for the webhook ingress.
    pub ingress_host: StringVar,
    /// Image used for the git checkout step.
    pub git_image: StringVar,

    initialized: AtomicBool,
    init_signal: Signal,
    init_receiver: Mutex<Option<SignalReceiver>>,
    subscribers: Mutex<Vec<Signal>>,
}

impl ControllerSettings {
    /// Settings holding their declared defaults.
    pub fn new() -> Self {
        let (init_signal, init_receiver) = Signal::channel();
        Self {
            max_pipeline_run: IntVar::new(DEFAULT_MAX_PIPELINE_RUN),
            enable_mail: BoolVar::new(false),
            external_host_name: StringVar::default(),
            expose_mode: StringVar::new(DEFAULT_EXPOSE_MODE),
            report_redirect_uri_template: StringVar::default(),
            smtp_host: StringVar::default(),
            smtp_user_secret: StringVar::default(),
            collect_period: IntVar::new(DEFAULT_COLLECT_PERIOD_HOURS),
            integration_job_ttl: IntVar::new(DEFAULT_JOB_TTL_HOURS),
            ingress_class: StringVar::default(),
            ingress_host: StringVar::default(),
            git_image: StringVar::new(DEFAULT_GIT_IMAGE),
            initialized: AtomicBool::new(false),
            init_signal,
            init_receiver: Mutex::new(Some(init_receiver)),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn bindings(&self) -> [FieldBinding<'_>; 12] {
        [
            FieldBinding::int("maxPipelineRun", &self.max_pipeline_run, Some(DEFAULT_MAX_PIPELINE_RUN)),
            FieldBinding::boolean("enableMail", &self.enable_mail, Some(false)),
            FieldBinding::string("externalHostName", &self.external_host_name, None),
            FieldBinding::string("exposeMode", &self.expose_mode, Some(DEFAULT_EXPOSE_MODE)),
            FieldBinding::string("reportRedirectUriTemplate", &self.report_redirect_uri_template, None),
            FieldBinding::string("smtpHost", &self.smtp_host, None),
            FieldBinding::string("smtpUserSecret", &self.smtp_user_secret, None),
            FieldBinding::int("collectPeriod", &self.collect_period, Some(DEFAULT_COLLECT_PERIOD_HOURS)),
            FieldBinding::int("integrationJobTTL", &self.integration_job_ttl, Some(DEFAULT_JOB_TTL_HOURS)),
            FieldBinding::string("ingressClass", &self.ingress_class, None),
            FieldBinding::string("ingressHost", &self.ingress_host, None),
            FieldBinding::string("gitImage", &self.git_image, Some(DEFAULT_GIT_IMAGE)),
        ]
    }

    /// Apply a `cicd-config` change.
    ///
    /// Fields are written first; cross-field validation runs afterwards, so a
    /// rejected change still leaves its individual fields applied.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Validation`] when mail is enabled without SMTP host or
    /// user secret. Subscribers are not notified in that case.
    pub fn apply_change(&self, data: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        apply_fields(data, &self.bindings());

        if self.enable_mail.get() && (self.smtp_host.is_empty() || self.smtp_user_secret.is_empty()) {
            return Err(ConfigError::Validation(
                "email is enabled but SMTP host or user secret is not set".into(),
            ));
        }

        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            tracing::info!("controller config initialized");
            self.init_signal.notify();
        }

        for subscriber in self.subscribers.lock().iter() {
            subscriber.notify();
        }
        Ok(())
    }

    /// Whether a change has been applied successfully at least once.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Take the receiver of the one-shot "initialized" signal. Only the first
    /// caller gets it.
    pub fn take_init_receiver(&self) -> Option<SignalReceiver> {
        self.init_receiver.lock().take()
    }

    /// Register a subscriber notified after every successful change.
    pub fn register_update_signal(&self, signal: Signal) {
        self.subscribers.lock().push(signal);
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigHandler for ControllerSettings {
    fn handle(&self, data: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        self.apply_change(data)
    }
}

impl AdmissionLimit for ControllerSettings {
    fn max_concurrent(&self) -> usize {
        usize::try_from(self.max_pipeline_run.get()).unwrap_or(0)
    }
}

/// Approval mail templates, bound to `email-template`.
pub struct EmailTemplates {
    /// Title of the approval request mail.
    pub request_title: StringVar,
    /// Body of the approval request mail.
    pub request_content: StringVar,
    /// Title of the approval result mail.
    pub result_title: StringVar,
    /// Body of the approval result mail.
    pub result_content: StringVar,
}

const DEFAULT_REQUEST_TITLE: &str = "[CI/CD] Approval '{{.Name}}' is requested to you";
const DEFAULT_RESULT_TITLE: &str = "[CI/CD] Approval is {{.Status.Result}}";
const DEFAULT_CONTENT: &str = "{{.Name}}";

impl EmailTemplates {
    /// Templates holding their declared defaults.
    pub fn new() -> Self {
        Self {
            request_title: StringVar::new(DEFAULT_REQUEST_TITLE),
            request_content: StringVar::new(DEFAULT_CONTENT),
            result_title: StringVar::new(DEFAULT_RESULT_TITLE),
            result_content: StringVar::new(DEFAULT_CONTENT),
        }
    }

    /// Apply an `email-template` change. Never fails.
    pub fn apply_change(&self, data: &BTreeMap<String, String>) {
        apply_fields(
            data,
            &[
                FieldBinding::string("request-title", &self.request_title, Some(DEFAULT_REQUEST_TITLE)),
                FieldBinding::string("request-content", &self.request_content, Some(DEFAULT_CONTENT)),
                FieldBinding::string("result-title", &self.result_title, Some(DEFAULT_RESULT_TITLE)),
                FieldBinding::string("result-content", &self.result_content, Some(DEFAULT_CONTENT)),
            ],
        );
    }
}

impl Default for EmailTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigHandler for EmailTemplates {
    fn handle(&self, data: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        self.apply_change(data);
        Ok(())
    }
}

/// Process-wide controller settings.
pub fn controller_settings() -> Arc<ControllerSettings> {
    static SETTINGS: OnceLock<Arc<ControllerSettings>> = OnceLock::new();
    Arc::clone(SETTINGS.get_or_init(|| Arc::new(ControllerSettings::new())))
}

/// Process-wide email templates.
pub fn email_templates() -> Arc<EmailTemplates> {
    static TEMPLATES: OnceLock<Arc<EmailTemplates>> = OnceLock::new();
    Arc::clone(TEMPLATES.get_or_init(|| Arc::new(EmailTemplates::new())))
}
