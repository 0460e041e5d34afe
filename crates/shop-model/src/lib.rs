//! Storefront Model
//!
//! Pure, synchronous building blocks of the dual-source catalog:
//! - Canonical records ([`Product`], [`Order`]) and identifiers ([`RecordId`])
//! - Normalization of heterogeneous backend payloads
//! - First-source-wins merging
//! - The single mutability classifier (seed ids below 80 are read-only)
//! - Dashboard statistics, cart and checkout
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use shop_model::{is_editable, merge, normalize, Product};
//!
//! let seed = normalize::<Product>(&json!({"products": [{"id": 5, "name": "Seed", "price": 10}]}));
//! let live = normalize::<Product>(&json!([{"id": 5, "name": "Live", "price": 11},
//!                                         {"id": 80, "name": "New", "price": 12}]));
//!
//! let merged = merge(seed, live);
//! assert_eq!(merged.len(), 2);
//! assert_eq!(merged[0].name, "Seed");
//! assert!(!is_editable(&merged[0].id));
//! assert!(is_editable(&merged[1].id));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod checkout;
pub mod id;
pub mod merge;
pub mod mutability;
pub mod normalize;
pub mod query;
pub mod record;
pub mod stats;

// Re-exports for convenience
pub use checkout::{build_order, validate_customer, Cart, CartLine, CheckoutError};
pub use id::{InvalidRecordId, RecordId, ORDER_PREFIX};
pub use merge::{merge, merge_counted, Merged};
pub use mutability::{
    ensure_editable, is_editable, source_info, source_of, Origin, ReadOnlyViolation, SourceInfo,
    EDITABLE_THRESHOLD,
};
pub use normalize::{normalize, normalize_one, raw_entries};
pub use query::{Page, ProductQuery, DEFAULT_PAGE_SIZE};
pub use record::{
    CatalogRecord, CustomerInfo, LineItem, Order, OrderPatch, OrderStatus, Product, ProductPatch,
    Resource, UnknownStatus,
};
pub use stats::{
    top_products, HourlyActivity, InventoryStats, OrderStats, SalesKpis, StockStatus, TopProduct,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with storefront records
    pub use crate::{
        ensure_editable, is_editable, merge, normalize, normalize_one, CatalogRecord, Order,
        OrderStatus, Origin, Product, RecordId, Resource,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
