//! Backend configuration
//!
//! Two sources are always configured: the read-only seed source and the
//! writable live source. Defaults point at the hosted mock and the live
//! API; a TOML file and the `SHOP_API_URL` environment variable override
//! them. A section present in the file replaces that source entirely.
//!
//! ```toml
//! request_timeout_ms = 5000
//!
//! [seed]
//! name = "seed"
//! fixtures_dir = "fixtures/seed"
//! products_path = "products"
//! orders_path = "orders"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use shop_model::Resource;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the live base URL
pub const API_URL_ENV: &str = "SHOP_API_URL";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const SEED_BASE_URL: &str = "https://f0de5f29-9d77-419c-8be9-169ccb882360.mock.pstmn.io";
const LIVE_BASE_URL: &str = "http://54.169.154.143:3470";

/// Settings for both backends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Read-only seed source
    pub seed: SourceConfig,
    /// Writable live source
    pub live: SourceConfig,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            seed: SourceConfig::seed(),
            live: SourceConfig::live(),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl SourcesConfig {
    /// Create with defaults
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults plus environment overrides
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_override(std::env::var(API_URL_ENV).ok())
    }

    /// Load from an optional TOML file, then apply environment overrides
    ///
    /// # Errors
    /// [`ConfigError`] when the file cannot be read or parsed, or the result
    /// fails [`SourcesConfig::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env_override(std::env::var(API_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file; absent keys keep their defaults
    ///
    /// # Errors
    /// [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replace the live base URL when an override is present and non-blank
    #[must_use]
    pub fn with_env_override(mut self, live_url: Option<String>) -> Self {
        if let Some(url) = live_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!(url = %url, "Live base URL overridden from environment");
            self.live.base_url = url.trim().to_string();
        }
        self
    }

    /// With live base URL
    #[inline]
    #[must_use]
    pub fn with_live_url(mut self, url: impl Into<String>) -> Self {
        self.live.base_url = url.into();
        self
    }

    /// With seed base URL
    #[inline]
    #[must_use]
    pub fn with_seed_url(mut self, url: impl Into<String>) -> Self {
        self.seed.base_url = url.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Per-request timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Check that both sources are usable
    ///
    /// # Errors
    /// [`ConfigError::ZeroTimeout`] or [`ConfigError::InvalidUrl`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        for source in [&self.seed, &self.live] {
            if source.fixtures_dir.is_none() {
                source.url()?;
            }
        }
        Ok(())
    }
}

/// Settings for one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Name used in logs and result messages
    pub name: String,
    /// HTTP base URL
    #[serde(default)]
    pub base_url: String,
    /// Read JSON fixtures from this directory instead of HTTP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixtures_dir: Option<PathBuf>,
    /// Path of the products collection
    pub products_path: String,
    /// Path of the orders collection
    pub orders_path: String,
}

impl SourceConfig {
    /// Default seed source (hosted mock)
    #[must_use]
    pub fn seed() -> Self {
        Self {
            name: "seed".to_string(),
            base_url: SEED_BASE_URL.to_string(),
            fixtures_dir: None,
            products_path: "ecomerce".to_string(),
            orders_path: "ecommerce-orders".to_string(),
        }
    }

    /// Default live source
    #[must_use]
    pub fn live() -> Self {
        Self {
            name: "live".to_string(),
            base_url: LIVE_BASE_URL.to_string(),
            fixtures_dir: None,
            products_path: "ecommerce-products".to_string(),
            orders_path: "ecommerce-orders".to_string(),
        }
    }

    /// With fixtures directory
    #[inline]
    #[must_use]
    pub fn with_fixtures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixtures_dir = Some(dir.into());
        self
    }

    /// Collection path for a resource
    #[must_use]
    pub fn path(&self, resource: Resource) -> &str {
        match resource {
            Resource::Products => &self.products_path,
            Resource::Orders => &self.orders_path,
        }
    }

    /// Parsed base URL
    ///
    /// # Errors
    /// [`ConfigError::InvalidUrl`] when the URL does not parse or cannot
    /// carry path segments.
    pub fn url(&self) -> Result<reqwest::Url, ConfigError> {
        let invalid = || ConfigError::InvalidUrl {
            source_name: self.name.clone(),
            url: self.base_url.clone(),
        };
        let url = reqwest::Url::parse(&self.base_url).map_err(|_| invalid())?;
        if url.cannot_be_a_base() {
            return Err(invalid());
        }
        Ok(url)
    }
}
