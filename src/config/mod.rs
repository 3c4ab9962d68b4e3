//! Configuration: static scheduler settings, typed process-wide settings,
//! and the watcher that keeps the latter in sync with config resources.

pub mod controller;
pub mod scheduler;
pub mod settings;
pub mod watcher;

pub use controller::{
    controller_settings, email_templates, ControllerSettings, EmailTemplates,
    CONTROLLER_CONFIG_NAME, DEFAULT_MAX_PIPELINE_RUN, EMAIL_TEMPLATE_NAME,
};
pub use scheduler::SchedulerConfig;
pub use settings::{apply_fields, BoolVar, FieldBinding, FieldKind, IntVar, StringVar};
pub use watcher::{ConfigHandler, ConfigWatcher};
