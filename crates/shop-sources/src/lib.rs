//! Storefront Sources - dual-backend access
//!
//! Reads and writes the storefront's two backends:
//! - A read-only seed source (hosted mock or local fixtures)
//! - A writable live source
//!
//! Reads query both concurrently and merge the results; a failing backend
//! only removes its own records. Writes are gated by the mutability
//! classifier and fan out to every target that should receive them.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_sources::{SourcesConfig, Storefront};
//! use shop_model::{ProductQuery, RecordId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storefront = Storefront::connect(&SourcesConfig::from_env())?;
//!
//! let page = storefront.products().list(&ProductQuery::new().with_text("kettle")).await;
//! println!("{} matching products", page.total);
//!
//! // Seed ids are refused before any request is made
//! let err = storefront.products().delete_product(&RecordId::Numeric(5)).await.unwrap_err();
//! assert!(err.is_read_only());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod backend;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fetcher;
pub mod storefront;

// Re-exports for convenience
pub use backend::{FileBackend, HttpBackend, QueryParams, SourceBackend, SourceSet, Target};
pub use catalog::{OrderCatalog, ProductCatalog, DEFAULT_FEATURED_LIMIT, DEFAULT_RELATED_LIMIT};
pub use config::{SourceConfig, SourcesConfig, API_URL_ENV, DEFAULT_TIMEOUT_MS};
pub use dispatcher::{MutationDispatcher, MutationReport};
pub use error::{ConfigError, Operation, ShopError, SourceError, TargetFailure};
pub use fetcher::{DualSourceFetcher, Fallback, SourcePair};
pub use storefront::{DashboardOverview, Storefront};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with storefront sources
    pub use crate::{
        MutationReport, OrderCatalog, ProductCatalog, ShopError, SourceBackend, SourcesConfig,
        Storefront, Target,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
