//! Config watcher: routes changed config resources to registered handlers.
//!
//! The watcher remembers the last resource version it handled for every
//! name. A resource is handed to its handler only when the version differs,
//! which absorbs duplicate deliveries from the watch transport. Events are
//! processed one at a time, so handler calls for a name never overlap and
//! follow arrival order.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::ConfigError;
use crate::core::store::{ConfigResource, ConfigStore};

/// Reacts to a changed config resource.
pub trait ConfigHandler: Send + Sync {
    /// Apply the resource's data.
    ///
    /// # Errors
    ///
    /// Returns an error when the data is unacceptable as a whole.
    fn handle(&self, data: &BTreeMap<String, String>) -> Result<(), ConfigError>;
}

impl<F> ConfigHandler for F
where
    F: Fn(&BTreeMap<String, String>) -> Result<(), ConfigError> + Send + Sync,
{
    fn handle(&self, data: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        self(data)
    }
}

/// Watches config resources and dispatches genuine changes.
pub struct ConfigWatcher<S> {
    store: Arc<S>,
    handlers: HashMap<String, Arc<dyn ConfigHandler>>,
    last_versions: HashMap<String, String>,
    retry: Duration,
}

impl<S: ConfigStore> ConfigWatcher<S> {
    /// Create a watcher with no handlers. `retry` is the pause before a
    /// dropped or failed watch is opened again.
    pub fn new(store: Arc<S>, retry: Duration) -> Self {
        Self {
            store,
            handlers: HashMap::new(),
            last_versions: HashMap::new(),
            retry,
        }
    }

    /// Register the handler for resource `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn ConfigHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with_handler(mut self, name: impl Into<String>, handler: Arc<dyn ConfigHandler>) -> Self {
        self.register(name, handler);
        self
    }

    /// Last version handled for `name`.
    pub fn last_version(&self, name: &str) -> Option<&str> {
        self.last_versions.get(name).map(String::as_str)
    }

    /// Handle one observed resource.
    ///
    /// Returns `Ok(true)` if the handler ran, `Ok(false)` if the resource has
    /// no handler or its version was already handled.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error. The version is recorded before the
    /// handler runs, so a rejected version is not retried on redelivery.
    pub fn reconcile(&mut self, resource: &ConfigResource) -> Result<bool, ConfigError> {
        let Some(handler) = self.handlers.get(&resource.name) else {
            tracing::trace!(name = %resource.name, "no handler registered");
            return Ok(false);
        };

        if self.last_versions.get(&resource.name) == Some(&resource.resource_version) {
            tracing::debug!(
                name = %resource.name,
                version = %resource.resource_version,
                "config version already handled"
            );
            return Ok(false);
        }

        tracing::info!(
            name = %resource.name,
            version = %resource.resource_version,
            "config changed"
        );
        self.last_versions
            .insert(resource.name.clone(), resource.resource_version.clone());
        handler.handle(&resource.data)?;
        Ok(true)
    }

    fn observe(&mut self, resource: &ConfigResource) {
        if let Err(e) = self.reconcile(resource) {
            tracing::error!(name = %resource.name, "config change rejected: {e}");
        }
    }

    /// Fetch and handle every registered resource.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingResource`] if a registered resource does not
    /// exist, or the store error if it cannot be read. Callers treat both as
    /// fatal. Handler errors are logged, not returned.
    pub async fn prime(&mut self) -> Result<(), ConfigError> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        for name in names {
            let resource = self
                .store
                .get(&name)
                .await?
                .ok_or_else(|| ConfigError::MissingResource(name.clone()))?;
            self.observe(&resource);
        }
        Ok(())
    }

    /// Watch for changes for process lifetime, reopening the watch after a
    /// drop or failure.
    pub async fn run(mut self) {
        loop {
            match self.store.watch().await {
                Ok(mut events) => {
                    tracing::debug!("config watch opened");
                    while let Some(resource) = events.recv().await {
                        self.observe(&resource);
                    }
                    tracing::info!("config watch closed, reopening");
                }
                Err(e) => tracing::warn!("failed to open config watch: {e}"),
            }
            tokio::time::sleep(self.retry).await;
        }
    }

    /// [`prime`](Self::prime), then [`run`](Self::run).
    ///
    /// # Errors
    ///
    /// Only startup failures from [`prime`](Self::prime); once watching, this
    /// never returns.
    pub async fn start(mut self) -> Result<(), ConfigError> {
        self.prime().await?;
        self.run().await;
        Ok(())
    }
}
