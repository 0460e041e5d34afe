//! Product and order catalogs
//!
//! Facades over the fetcher and the dispatcher with the routing each
//! collection needs:
//! - Products: reads merge seed then live; writes fan out to live and seed
//! - Orders: reads merge seed then live; writes go to live only
//!
//! Every update and delete passes through the mutability classifier before
//! a request is made.

use crate::backend::{QueryParams, SourceSet};
use crate::dispatcher::{MutationDispatcher, MutationReport};
use crate::error::ShopError;
use crate::fetcher::DualSourceFetcher;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use shop_model::{
    build_order, normalize, normalize_one, source_info, source_of, Cart, CustomerInfo, Order,
    OrderPatch, OrderStatus, Origin, Page, Product, ProductPatch, ProductQuery, RecordId,
    Resource, SourceInfo,
};

/// Default number of featured products
pub const DEFAULT_FEATURED_LIMIT: usize = 8;

/// Default number of related products
pub const DEFAULT_RELATED_LIMIT: usize = 4;

/// Products across both sources
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    sources: SourceSet,
    fetcher: DualSourceFetcher,
    dispatcher: MutationDispatcher,
}

impl ProductCatalog {
    /// Create catalog; seed records win id collisions
    #[must_use]
    pub fn new(sources: SourceSet) -> Self {
        let fetcher = DualSourceFetcher::new(sources.seed.clone(), sources.live.clone());
        let dispatcher =
            MutationDispatcher::new(sources.live.clone()).with_target(sources.seed.clone());
        Self {
            sources,
            fetcher,
            dispatcher,
        }
    }

    /// Every product from both sources, merged
    pub async fn all(&self) -> Vec<Product> {
        self.fetcher.fetch_merged::<Product>().await
    }

    /// Filtered, paginated listing
    ///
    /// Filters run locally over the merged collection so that seed and live
    /// records are matched the same way.
    pub async fn list(&self, query: &ProductQuery) -> Page<Product> {
        let page = query.apply(self.all().await);
        tracing::debug!(total = page.total, page = page.page, "Listed products");
        page
    }

    /// Text search over name and description
    pub async fn search(&self, text: &str) -> Page<Product> {
        self.list(&ProductQuery::new().with_text(text)).await
    }

    /// Products in one category
    pub async fn by_category(&self, category: &str) -> Page<Product> {
        self.list(&ProductQuery::new().with_category(category)).await
    }

    /// Distinct categories in first-seen order
    pub async fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for product in self.all().await {
            if !categories.contains(&product.category) {
                categories.push(product.category);
            }
        }
        categories
    }

    /// One product, preferring the live copy
    ///
    /// Both sources are asked concurrently: the live record endpoint and the
    /// seed collection.
    ///
    /// # Errors
    /// [`ShopError::NotFound`] when neither source has the product.
    pub async fn get_product(&self, id: &RecordId) -> Result<Product, ShopError> {
        let (live, seed) = futures::join!(
            self.sources.live.backend().get(Resource::Products, id),
            self.sources.seed.backend().list(Resource::Products, &[]),
        );

        match live {
            Ok(raw) => {
                if let Some(product) = normalize_one::<Product>(&raw) {
                    return Ok(product);
                }
                tracing::debug!(%id, "Live response held no usable product");
            }
            Err(error) if error.is_not_found() => {}
            Err(error) => tracing::warn!(source = self.sources.live.name(), %id, %error, "Product lookup failed"),
        }

        let from_seed = match seed {
            Ok(raw) => normalize::<Product>(&raw).into_iter().find(|p| &p.id == id),
            Err(error) => {
                tracing::warn!(source = self.sources.seed.name(), %id, %error, "Product lookup failed");
                None
            }
        };
        from_seed.ok_or_else(|| ShopError::NotFound {
            resource: Resource::Products,
            id: id.clone(),
        })
    }

    /// Featured products from the live source; empty when it is unavailable
    pub async fn featured(&self, limit: usize) -> Vec<Product> {
        let query = [
            ("featured".to_string(), "true".to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        self.live_selection(&query, limit).await
    }

    /// Products related to `id` from the live source; empty when it is
    /// unavailable
    pub async fn related(&self, id: &RecordId, limit: usize) -> Vec<Product> {
        let query = [
            ("related".to_string(), id.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        self.live_selection(&query, limit).await
    }

    async fn live_selection(&self, query: &QueryParams, limit: usize) -> Vec<Product> {
        match self.sources.live.backend().list(Resource::Products, query).await {
            Ok(raw) => {
                let mut products = normalize::<Product>(&raw);
                products.truncate(limit);
                products
            }
            Err(error) => {
                tracing::warn!(source = self.sources.live.name(), %error, "Product selection failed");
                Vec::new()
            }
        }
    }

    /// Create a product on the live source
    ///
    /// # Errors
    /// [`ShopError::Source`] when the live source rejects it.
    pub async fn create_product(
        &self,
        product: &Product,
    ) -> Result<MutationReport<Product>, ShopError> {
        let body = to_body(product);
        let report = self.dispatcher.create(Resource::Products, &body).await?;
        Ok(report.map(|raw| echoed(&raw).unwrap_or_else(|| product.clone())))
    }

    /// Patch a product on every source that accepts it
    ///
    /// # Errors
    /// [`ShopError::ReadOnly`] for seed ids, otherwise
    /// [`ShopError::AllTargetsFailed`] when no source accepted the patch.
    pub async fn update_product(
        &self,
        id: &RecordId,
        patch: &ProductPatch,
    ) -> Result<MutationReport<Value>, ShopError> {
        self.dispatcher
            .update(Resource::Products, id, &to_body(patch))
            .await
    }

    /// Delete a product from every source that accepts it
    ///
    /// # Errors
    /// Same as [`ProductCatalog::update_product`].
    pub async fn delete_product(&self, id: &RecordId) -> Result<MutationReport<()>, ShopError> {
        self.dispatcher.delete(Resource::Products, id).await
    }

    /// Copy a seed product into the live source
    ///
    /// # Errors
    /// - [`ShopError::Source`] when the seed source cannot be read or the
    ///   live source rejects the copy
    /// - [`ShopError::NotFound`] when the seed source has no such product
    pub async fn sync_product(&self, id: &RecordId) -> Result<MutationReport<Product>, ShopError> {
        let seed = &self.sources.seed;
        let raw = seed
            .backend()
            .list(Resource::Products, &[])
            .await
            .map_err(|source| ShopError::Source {
                target: seed.name().to_string(),
                source,
            })?;
        let product = normalize::<Product>(&raw)
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| ShopError::NotFound {
                resource: Resource::Products,
                id: id.clone(),
            })?;

        tracing::info!(%id, name = %product.name, "Syncing seed product to live");
        self.create_product(&product).await
    }
}

/// Orders across both sources
#[derive(Debug, Clone)]
pub struct OrderCatalog {
    sources: SourceSet,
    fetcher: DualSourceFetcher,
    dispatcher: MutationDispatcher,
}

impl OrderCatalog {
    /// Create catalog; order writes go to the live source only
    #[must_use]
    pub fn new(sources: SourceSet) -> Self {
        let fetcher = DualSourceFetcher::new(sources.seed.clone(), sources.live.clone());
        let dispatcher = MutationDispatcher::new(sources.live.clone());
        Self {
            sources,
            fetcher,
            dispatcher,
        }
    }

    /// Every order from both sources, merged
    pub async fn list_orders(&self) -> Vec<Order> {
        self.fetcher.fetch_merged::<Order>().await
    }

    /// One order
    ///
    /// Seed-range ids are looked up in the seed collection first; anything
    /// not found there is requested from the live source.
    ///
    /// # Errors
    /// [`ShopError::NotFound`] when neither source has the order.
    pub async fn get_order(&self, id: &RecordId) -> Result<Order, ShopError> {
        if source_of(id) == Origin::Seed {
            let seed = &self.sources.seed;
            match seed.backend().list(Resource::Orders, &[]).await {
                Ok(raw) => {
                    if let Some(order) = normalize::<Order>(&raw).into_iter().find(|o| &o.id == id) {
                        return Ok(order);
                    }
                }
                Err(error) => {
                    tracing::warn!(source = seed.name(), %id, %error, "Order lookup failed");
                }
            }
        }

        let live = &self.sources.live;
        match live.backend().get(Resource::Orders, id).await {
            Ok(raw) => {
                if let Some(order) = normalize_one::<Order>(&raw) {
                    return Ok(order);
                }
            }
            Err(error) if error.is_not_found() => {}
            Err(error) => tracing::warn!(source = live.name(), %id, %error, "Order lookup failed"),
        }

        Err(ShopError::NotFound {
            resource: Resource::Orders,
            id: id.clone(),
        })
    }

    /// Create an order on the live source
    ///
    /// # Errors
    /// [`ShopError::Source`] when the live source rejects it.
    pub async fn create_order(&self, order: &Order) -> Result<MutationReport<Order>, ShopError> {
        let report = self
            .dispatcher
            .create(Resource::Orders, &to_body(order))
            .await?;
        Ok(report.map(|raw| echoed(&raw).unwrap_or_else(|| order.clone())))
    }

    /// Check out a cart as a new pending order
    ///
    /// # Errors
    /// [`ShopError::Checkout`] when the cart or customer details are
    /// rejected, otherwise as [`OrderCatalog::create_order`].
    pub async fn place_order(
        &self,
        cart: &Cart,
        customer: CustomerInfo,
    ) -> Result<MutationReport<Order>, ShopError> {
        let order = build_order(cart, customer, Utc::now())?;
        tracing::info!(id = %order.id, total = order.total, items = order.items.len(), "Placing order");
        self.create_order(&order).await
    }

    /// Patch an order
    ///
    /// # Errors
    /// [`ShopError::ReadOnly`] for seed ids, otherwise [`ShopError::Source`]
    /// when the live source rejects the patch.
    pub async fn update_order(
        &self,
        id: &RecordId,
        patch: &OrderPatch,
    ) -> Result<MutationReport<Value>, ShopError> {
        self.dispatcher
            .update(Resource::Orders, id, &to_body(patch))
            .await
    }

    /// Move an order to a new status
    ///
    /// # Errors
    /// Same as [`OrderCatalog::update_order`].
    pub async fn update_order_status(
        &self,
        id: &RecordId,
        status: OrderStatus,
    ) -> Result<MutationReport<Value>, ShopError> {
        self.update_order(id, &OrderPatch::status(status)).await
    }

    /// Delete an order
    ///
    /// # Errors
    /// Same as [`OrderCatalog::update_order`].
    pub async fn delete_order(&self, id: &RecordId) -> Result<MutationReport<()>, ShopError> {
        self.dispatcher.delete(Resource::Orders, id).await
    }

    /// Origin and editability of an order id
    #[inline]
    #[must_use]
    pub fn source_info(&self, id: &RecordId) -> SourceInfo {
        source_info(id)
    }
}

fn to_body<T: Serialize>(value: &T) -> Value {
    // Record and patch types serialize to plain JSON objects.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// The record a create response echoes back, when it carries one
///
/// Live responses are either the record itself or `{ "data": record }`.
fn echoed<R: shop_model::CatalogRecord>(raw: &Value) -> Option<R> {
    normalize_one::<R>(raw).or_else(|| raw.get("data").and_then(normalize_one::<R>))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockSourceBackend, Target};
    use crate::error::SourceError;
    use serde_json::json;
    use std::sync::Arc;

    fn sources(seed: MockSourceBackend, live: MockSourceBackend) -> SourceSet {
        SourceSet::new(
            Target::new("seed", Arc::new(seed)),
            Target::new("live", Arc::new(live)),
        )
    }

    fn not_found() -> SourceError {
        SourceError::Status {
            status: 404,
            url: "mock".into(),
        }
    }

    fn seed_products() -> Value {
        json!({"products": [
            {"id": 5, "name": "Seed kettle", "price": 590, "category": "Kitchen"},
            {"id": 6, "name": "Desk fan", "price": 890, "category": "Cooling"}
        ]})
    }

    #[tokio::test]
    async fn get_product_prefers_live() {
        let mut seed = MockSourceBackend::new();
        seed.expect_list().returning(|_, _| Ok(seed_products()));
        let mut live = MockSourceBackend::new();
        live.expect_get()
            .returning(|_, _| Ok(json!({"id": 5, "name": "Live kettle", "price": 650})));

        let catalog = ProductCatalog::new(sources(seed, live));
        let product = catalog.get_product(&RecordId::Numeric(5)).await.unwrap();
        assert_eq!(product.name, "Live kettle");
    }

    #[tokio::test]
    async fn get_product_falls_back_to_seed_then_not_found() {
        let mut seed = MockSourceBackend::new();
        seed.expect_list().returning(|_, _| Ok(seed_products()));
        let mut live = MockSourceBackend::new();
        live.expect_get().returning(|_, _| Err(not_found()));

        let catalog = ProductCatalog::new(sources(seed, live));
        let product = catalog.get_product(&RecordId::Numeric(6)).await.unwrap();
        assert_eq!(product.name, "Desk fan");

        let err = catalog.get_product(&RecordId::Numeric(7)).await.unwrap_err();
        assert!(matches!(err, ShopError::NotFound { .. }));
    }

    #[tokio::test]
    async fn featured_truncates_and_degrades_to_empty() {
        let mut live = MockSourceBackend::new();
        live.expect_list()
            .withf(|_, query| query.iter().any(|(k, v)| k == "featured" && v == "true"))
            .times(1)
            .returning(|_, _| {
                Ok(json!([
                    {"id": 81, "name": "A", "price": 1},
                    {"id": 82, "name": "B", "price": 1},
                    {"id": 83, "name": "C", "price": 1}
                ]))
            });
        live.expect_list()
            .withf(|_, query| query.iter().any(|(k, _)| k == "related"))
            .times(1)
            .returning(|_, _| Err(SourceError::Timeout { url: "mock".into() }));

        let catalog = ProductCatalog::new(sources(MockSourceBackend::new(), live));
        assert_eq!(catalog.featured(2).await.len(), 2);
        assert!(catalog.related(&RecordId::Numeric(81), 4).await.is_empty());
    }

    #[tokio::test]
    async fn categories_and_filters_run_over_the_merge() {
        let mut seed = MockSourceBackend::new();
        seed.expect_list().returning(|_, _| Ok(seed_products()));
        let mut live = MockSourceBackend::new();
        live.expect_list().returning(|_, _| {
            Ok(json!([{"id": 90, "name": "Rice cooker", "price": 1200, "category": "Kitchen"}]))
        });

        let catalog = ProductCatalog::new(sources(seed, live));
        assert_eq!(catalog.categories().await, vec!["Kitchen", "Cooling"]);
        assert_eq!(catalog.by_category("Kitchen").await.total, 2);
        assert_eq!(catalog.search("fan").await.data[0].id, RecordId::Numeric(6));
    }

    #[tokio::test]
    async fn sync_copies_seed_product_to_live() {
        let mut seed = MockSourceBackend::new();
        seed.expect_list().returning(|_, _| Ok(seed_products()));
        seed.expect_create().never();
        let mut live = MockSourceBackend::new();
        live.expect_create()
            .withf(|resource, body| *resource == Resource::Products && body["name"] == "Desk fan")
            .times(1)
            .returning(|_, body| Ok(json!({"success": true, "data": body.clone()})));

        let catalog = ProductCatalog::new(sources(seed, live));
        let report = catalog.sync_product(&RecordId::Numeric(6)).await.unwrap();
        assert_eq!(report.data.name, "Desk fan");
        assert_eq!(report.message, "created product 6 in live");
    }

    #[tokio::test]
    async fn seed_order_lookup_falls_back_to_live() {
        let mut seed = MockSourceBackend::new();
        seed.expect_list()
            .returning(|_, _| Ok(json!({"orders": [{"id": "ORD-00001", "status": "success", "total": 70}]})));
        let mut live = MockSourceBackend::new();
        live.expect_get()
            .withf(|_, id| *id == RecordId::seed_order(2))
            .returning(|_, _| Ok(json!({"id": "ORD-00002", "status": "pending", "total": 10})));

        let catalog = OrderCatalog::new(sources(seed, live));
        let first = catalog.get_order(&RecordId::seed_order(1)).await.unwrap();
        assert_eq!(first.status, OrderStatus::Success);
        let second = catalog.get_order(&RecordId::seed_order(2)).await.unwrap();
        assert_eq!(second.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn order_status_change_is_gated_and_live_only() {
        let mut seed = MockSourceBackend::new();
        seed.expect_update().never();
        let mut live = MockSourceBackend::new();
        live.expect_update()
            .withf(|resource, id, body| {
                *resource == Resource::Orders
                    && *id == RecordId::Numeric(1_700_000_000_000)
                    && *body == json!({"status": "shipped"})
            })
            .times(1)
            .returning(|_, _, body| Ok(body.clone()));

        let catalog = OrderCatalog::new(sources(seed, live));
        let err = catalog
            .update_order_status(&RecordId::seed_order(12), OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(err.is_read_only());

        let report = catalog
            .update_order_status(&RecordId::Numeric(1_700_000_000_000), OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(report.succeeded, vec!["live"]);
        assert!(catalog.source_info(&RecordId::Numeric(1_700_000_000_000)).editable);
    }

    #[tokio::test]
    async fn place_order_validates_before_sending() {
        let mut live = MockSourceBackend::new();
        live.expect_create().never();
        let catalog = OrderCatalog::new(sources(MockSourceBackend::new(), live));

        let err = catalog
            .place_order(&Cart::new(), CustomerInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Checkout(_)));
    }
}
