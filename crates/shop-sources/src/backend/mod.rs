//! Backend abstraction
//!
//! A [`SourceBackend`] speaks raw JSON for one data source. Shapes are
//! left to [`shop_model::normalize`]; backends only move payloads and report
//! failures as [`SourceError`].
//!
//! Implementations:
//! - [`HttpBackend`]: REST endpoints over `reqwest`
//! - [`FileBackend`]: read-only JSON fixtures on disk

mod file;
mod http;

pub use file::FileBackend;
pub use http::HttpBackend;

use crate::config::{SourceConfig, SourcesConfig};
use crate::error::{ConfigError, SourceError};
use async_trait::async_trait;
use serde_json::Value;
use shop_model::{RecordId, Resource};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Query parameters forwarded to a collection endpoint
pub type QueryParams = [(String, String)];

/// One data source
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceBackend: Send + Sync {
    /// Fetch a collection payload
    async fn list(&self, resource: Resource, query: &QueryParams) -> Result<Value, SourceError>;

    /// Fetch a single record payload
    async fn get(&self, resource: Resource, id: &RecordId) -> Result<Value, SourceError>;

    /// Create a record; returns the backend's response body
    async fn create(&self, resource: Resource, body: &Value) -> Result<Value, SourceError>;

    /// Update a record; returns the backend's response body
    async fn update(
        &self,
        resource: Resource,
        id: &RecordId,
        body: &Value,
    ) -> Result<Value, SourceError>;

    /// Delete a record
    async fn delete(&self, resource: Resource, id: &RecordId) -> Result<(), SourceError>;
}

/// A backend with the name used in logs and result messages
#[derive(Clone)]
pub struct Target {
    name: String,
    backend: Arc<dyn SourceBackend>,
}

impl Target {
    /// Create target
    #[must_use]
    pub fn new(name: impl Into<String>, backend: Arc<dyn SourceBackend>) -> Self {
        Self {
            name: name.into(),
            backend,
        }
    }

    /// Build the backend a source config describes
    ///
    /// # Errors
    /// [`ConfigError`] when the base URL is unusable or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &SourceConfig, timeout: Duration) -> Result<Self, ConfigError> {
        let backend: Arc<dyn SourceBackend> = match &config.fixtures_dir {
            Some(dir) => Arc::new(FileBackend::new(dir, config.clone())),
            None => Arc::new(HttpBackend::new(config.clone(), timeout)?),
        };
        Ok(Self::new(config.name.clone(), backend))
    }

    /// Target name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying backend
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &dyn SourceBackend {
        self.backend.as_ref()
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target").field("name", &self.name).finish_non_exhaustive()
    }
}

/// The seed and live targets of one deployment
#[derive(Debug, Clone)]
pub struct SourceSet {
    /// Read-only seed target
    pub seed: Target,
    /// Writable live target
    pub live: Target,
}

impl SourceSet {
    /// Create from prepared targets
    #[must_use]
    pub fn new(seed: Target, live: Target) -> Self {
        Self { seed, live }
    }

    /// Build both targets from configuration
    ///
    /// # Errors
    /// [`ConfigError`] from [`SourcesConfig::validate`] or backend
    /// construction.
    pub fn from_config(config: &SourcesConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let timeout = config.timeout();
        Ok(Self {
            seed: Target::from_config(&config.seed, timeout)?,
            live: Target::from_config(&config.live, timeout)?,
        })
    }
}
