//! Storefront entry point
//!
//! Wires one [`SourceSet`] into both catalogs and computes the admin
//! dashboard from their merged collections.

use crate::backend::SourceSet;
use crate::catalog::{OrderCatalog, ProductCatalog};
use crate::config::SourcesConfig;
use crate::error::ConfigError;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use shop_model::{
    top_products, HourlyActivity, InventoryStats, Order, OrderStats, Product, SalesKpis,
    TopProduct,
};

/// Number of best sellers on the dashboard
pub const TOP_PRODUCTS: usize = 5;

/// Both catalogs over one pair of sources
#[derive(Debug, Clone)]
pub struct Storefront {
    products: ProductCatalog,
    orders: OrderCatalog,
}

impl Storefront {
    /// Create from prepared sources
    #[must_use]
    pub fn new(sources: SourceSet) -> Self {
        Self {
            products: ProductCatalog::new(sources.clone()),
            orders: OrderCatalog::new(sources),
        }
    }

    /// Build backends from configuration
    ///
    /// # Errors
    /// [`ConfigError`] when the configuration is invalid.
    pub fn connect(config: &SourcesConfig) -> Result<Self, ConfigError> {
        let sources = SourceSet::from_config(config)?;
        tracing::info!(
            seed = sources.seed.name(),
            live = sources.live.name(),
            timeout_ms = config.request_timeout_ms,
            "Storefront sources configured"
        );
        Ok(Self::new(sources))
    }

    /// Product catalog
    #[inline]
    #[must_use]
    pub fn products(&self) -> &ProductCatalog {
        &self.products
    }

    /// Order catalog
    #[inline]
    #[must_use]
    pub fn orders(&self) -> &OrderCatalog {
        &self.orders
    }

    /// Dashboard figures as of `now`
    ///
    /// Products and orders are fetched concurrently; calendar figures use the
    /// offset of `now`.
    pub async fn dashboard(&self, now: DateTime<FixedOffset>) -> DashboardOverview {
        let (products, mut orders) =
            futures::join!(self.products.all(), self.orders.list_orders());
        Order::newest_first(&mut orders);
        DashboardOverview::compute(&products, &orders, now)
    }
}

/// Admin overview figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardOverview {
    /// Order counts and revenue
    pub orders: OrderStats,
    /// Stock figures
    pub inventory: InventoryStats,
    /// Today and this week
    pub sales: SalesKpis,
    /// Today's orders by hour
    pub hourly: HourlyActivity,
    /// Best sellers by units
    pub top_products: Vec<TopProduct>,
    /// Most recent orders first
    pub recent_orders: Vec<Order>,
}

impl DashboardOverview {
    /// Number of recent orders kept
    pub const RECENT_ORDERS: usize = 5;

    /// Compute from merged collections; `orders` should be newest first
    #[must_use]
    pub fn compute(products: &[Product], orders: &[Order], now: DateTime<FixedOffset>) -> Self {
        Self {
            orders: OrderStats::from_orders(orders),
            inventory: InventoryStats::from_products(products),
            sales: SalesKpis::compute(orders, now),
            hourly: HourlyActivity::compute(orders, now),
            top_products: top_products(orders, products, TOP_PRODUCTS),
            recent_orders: orders.iter().take(Self::RECENT_ORDERS).cloned().collect(),
        }
    }
}
