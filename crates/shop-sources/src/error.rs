//! Error types for the source layer
//!
//! Three layers of failure:
//! - [`SourceError`] for a single request against a single backend
//! - [`ShopError`] for catalog operations, including fan-out outcomes
//! - [`ConfigError`] for loading and validating backend configuration

use shop_model::{CheckoutError, ReadOnlyViolation, RecordId, Resource};
use std::fmt;
use std::path::PathBuf;

/// Failure of one request against one backend
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Connection, DNS or protocol failure
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying client message
        message: String,
    },

    /// No response within the configured timeout
    #[error("request to {url} timed out")]
    Timeout {
        /// Requested URL
        url: String,
    },

    /// Non-2xx response
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Body was not valid JSON
    #[error("invalid JSON from {url}: {message}")]
    Decode {
        /// Requested URL or file
        url: String,
        /// Parser message
        message: String,
    },

    /// Backend cannot perform this operation
    #[error("{backend} does not support {operation}")]
    Unsupported {
        /// Backend description
        backend: String,
        /// Attempted operation
        operation: Operation,
    },

    /// Fixture file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// HTTP status when the backend answered with one
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the record simply does not exist at this backend
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether the backend could not be reached at all
    #[inline]
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }

    pub(crate) fn from_reqwest(url: &str, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if error.is_decode() {
            Self::Decode {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Mutating operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create a record
    Create,
    /// Replace or patch a record
    Update,
    /// Remove a record
    Delete,
}

impl Operation {
    /// Lowercase verb
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Past tense used in result messages
    #[must_use]
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// One target's failure inside a fan-out
#[derive(Debug, thiserror::Error)]
#[error("{target}: {error}")]
pub struct TargetFailure {
    /// Target name
    pub target: String,
    /// What went wrong
    #[source]
    pub error: SourceError,
}

/// Catalog operation errors
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    /// Mutation of a seed-range record was refused before any request
    #[error(transparent)]
    ReadOnly(#[from] ReadOnlyViolation),

    /// Every target of a fan-out failed
    #[error("failed to {operation} {resource} {id}: {}", describe(.failures))]
    AllTargetsFailed {
        /// Attempted operation
        operation: Operation,
        /// Collection
        resource: Resource,
        /// Record id, or `new` for creates
        id: String,
        /// Per-target failures, in target order
        failures: Vec<TargetFailure>,
    },

    /// No backend knows the record
    #[error("{resource} {id} not found")]
    NotFound {
        /// Collection
        resource: Resource,
        /// Requested id
        id: RecordId,
    },

    /// A single-backend request failed
    #[error("{target} unavailable: {source}")]
    Source {
        /// Target name
        target: String,
        /// Underlying error
        #[source]
        source: SourceError,
    },

    /// Cart or customer details rejected
    #[error("checkout rejected: {0}")]
    Checkout(#[from] CheckoutError),
}

impl ShopError {
    /// Whether the error is caused by the caller's input rather than a backend
    #[inline]
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::ReadOnly(_) | Self::NotFound { .. } | Self::Checkout(_)
        )
    }

    /// Whether a read-only record was targeted
    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly(_))
    }

    /// Per-target failures of a fan-out; empty for other variants
    #[must_use]
    pub fn failures(&self) -> &[TargetFailure] {
        match self {
            Self::AllTargetsFailed { failures, .. } => failures,
            _ => &[],
        }
    }
}

fn describe(failures: &[TargetFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        /// File path
        path: PathBuf,
        /// Parser error
        #[source]
        source: toml::de::Error,
    },

    /// Base URL cannot be used for requests
    #[error("invalid base URL for {source_name}: {url}")]
    InvalidUrl {
        /// Source name
        source_name: String,
        /// Offending value
        url: String,
    },

    /// Request timeout must be positive
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
