//! # CI/CD Scheduler
//!
//! Admission control for CI/CD integration jobs, plus the config plumbing
//! that feeds it.
//!
//! Jobs enter as *pending*. A single dispatch loop promotes the oldest
//! pending jobs to *running* until a configurable concurrency cap is reached,
//! and jobs that finish or disappear free their slot on the next pass.
//!
//! ## Key Features
//!
//! - **Coalesced triggering**: any number of `schedule()` calls made while a
//!   pass is already queued collapse into that pass
//! - **Rate-limited passes**: the loop sleeps for a cooldown after each pass
//! - **Oldest-first admission**: pending jobs are ordered by creation time,
//!   ties broken by namespace and name
//! - **Live cap**: the cap is read from process-wide settings at the start of
//!   every pass, so config changes apply without a restart
//! - **Config dispatch**: versioned config resources are routed to typed
//!   handlers exactly once per version
//!
//! ## Wiring
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cicd_scheduler::builders::{build_config_watcher, build_scheduler};
//! use cicd_scheduler::config::{controller_settings, email_templates, SchedulerConfig};
//! use cicd_scheduler::runtime::{JobReconciler, TokioSpawner};
//!
//! let cfg = SchedulerConfig::from_env()?;
//! let settings = controller_settings();
//!
//! let mut watcher = build_config_watcher(&cfg, config_store, settings.clone(), email_templates())?;
//! watcher.prime().await?; // missing config resources are fatal
//! tokio::spawn(watcher.run());
//!
//! let spawner = TokioSpawner::current();
//! let (scheduler, _audit) = build_scheduler(&cfg, job_store.clone(), executor, settings, &spawner)?;
//! tokio::spawn(JobReconciler::new(job_store, scheduler, cfg.watch_retry()).run());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Job model, pools, and the admission scheduler.
pub mod core;
/// Static scheduler configuration and dynamic process-wide settings.
pub mod config;
/// Builders to construct scheduler components from configuration.
pub mod builders;
/// In-memory adapters for the job and config stores.
pub mod infra;
/// Runtime adapters: tokio spawner and job reconcile loop.
pub mod runtime;
/// Shared utilities.
pub mod util;
