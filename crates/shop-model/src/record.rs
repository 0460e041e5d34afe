//! Canonical storefront records
//!
//! Defines the in-memory shapes every backend payload is normalized into:
//! - [`Product`] with all display defaults applied
//! - [`Order`] with line items, status and customer details
//! - [`Resource`] naming the logical collection a record belongs to
//!
//! Construction from raw JSON goes through [`CatalogRecord::from_raw`], which
//! is lenient about optional fields and strict about required ones.

use crate::id::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Image shown when a product carries none
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-product.svg";

/// Category assigned when a product carries none
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Currency assigned when a product carries none
pub const DEFAULT_CURRENCY: &str = "THB";

/// Logical collection served by both backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Product catalog
    Products,
    /// Customer orders
    Orders,
}

impl Resource {
    /// Wrapper key used by `{ "<key>": [...] }` payloads
    #[inline]
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Orders => "orders",
        }
    }

    /// Singular noun for messages
    #[inline]
    #[must_use]
    pub fn singular(self) -> &'static str {
        match self {
            Self::Products => "product",
            Self::Orders => "order",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

/// A record that can be normalized from backend JSON
pub trait CatalogRecord: Sized + Clone + fmt::Debug {
    /// Collection this record type belongs to
    const RESOURCE: Resource;

    /// Identifier used for merge and mutability decisions
    fn id(&self) -> &RecordId;

    /// Build a record from one raw JSON object
    ///
    /// Returns `None` when a required field is missing or unusable.
    fn from_raw(raw: &Map<String, Value>) -> Option<Self>;
}

/// Product as shown on the storefront and in the admin dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Identifier
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Long description
    pub description: String,
    /// Image URL or path
    pub image: String,
    /// Image alt text
    pub image_alt: String,
    /// Category
    pub category: String,
    /// Brand
    pub brand: String,
    /// Units in stock
    pub stock: u32,
    /// ISO currency code
    pub currency: String,
}

impl Product {
    /// Create a product with defaults for every optional field
    #[must_use]
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>, price: f64) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            image_alt: name.clone(),
            name,
            price,
            description: String::new(),
            image: PLACEHOLDER_IMAGE.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            brand: String::new(),
            stock: 0,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// With category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// With stock
    #[inline]
    #[must_use]
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl CatalogRecord for Product {
    const RESOURCE: Resource = Resource::Products;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn from_raw(raw: &Map<String, Value>) -> Option<Self> {
        let id = RecordId::from_json(raw.get("id")?)?;
        let name = text(raw, "name")?.to_string();
        let price = number(raw.get("price")?)?;

        Some(Self {
            id,
            price,
            description: text(raw, "description").unwrap_or_default().to_string(),
            image: text(raw, "image").unwrap_or(PLACEHOLDER_IMAGE).to_string(),
            image_alt: text(raw, "imageAlt").unwrap_or(&name).to_string(),
            category: text(raw, "category").unwrap_or(DEFAULT_CATEGORY).to_string(),
            brand: text(raw, "brand").unwrap_or_default().to_string(),
            stock: raw.get("stock").and_then(count).unwrap_or(0),
            currency: text(raw, "currency").unwrap_or(DEFAULT_CURRENCY).to_string(),
            name,
        })
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting processing
    #[default]
    Pending,
    /// Paid
    Success,
    /// Payment failed
    Failed,
    /// Fulfilled
    Completed,
    /// Handed to the carrier
    Shipped,
    /// Cancelled
    Cancelled,
}

impl OrderStatus {
    /// Every status, in dashboard order
    pub const ALL: [OrderStatus; 6] = [
        Self::Pending,
        Self::Success,
        Self::Failed,
        Self::Completed,
        Self::Shipped,
        Self::Cancelled,
    ];

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Shipped => "shipped",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown order status name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// One product line inside an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product identifier
    pub product_id: RecordId,
    /// Quantity ordered
    pub qty: u32,
    /// Unit price at order time
    pub price: f64,
}

impl LineItem {
    /// Line subtotal
    #[inline]
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        f64::from(self.qty) * self.price
    }

    fn from_raw(raw: &Value) -> Option<Self> {
        let raw = raw.as_object()?;
        Some(Self {
            product_id: RecordId::from_json(raw.get("productId")?)?,
            qty: raw.get("qty").and_then(count).unwrap_or(1),
            price: raw.get("price").and_then(number).unwrap_or(0.0),
        })
    }
}

/// Buyer contact details captured at checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Shipping address
    #[serde(default)]
    pub address: String,
}

impl CustomerInfo {
    fn from_raw(raw: &Value) -> Option<Self> {
        let raw = raw.as_object()?;
        let field = |key: &str| text(raw, key).unwrap_or_default().to_string();
        Some(Self {
            name: field("name"),
            email: field("email"),
            phone: field("phone"),
            address: field("address"),
        })
    }
}

/// Customer order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Identifier (`ORD-00042` for seed orders)
    pub id: RecordId,
    /// Creation time
    #[serde(rename = "createAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Ordered lines
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Order total
    pub total: f64,
    /// Lifecycle status
    #[serde(default)]
    pub status: OrderStatus,
    /// Buyer details
    #[serde(rename = "customerInfo", default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerInfo>,
}

impl Order {
    /// Sort orders newest first; orders without a timestamp go last
    ///
    /// The sort is stable, so equal timestamps keep their merged order.
    pub fn newest_first(orders: &mut [Order]) {
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}

impl CatalogRecord for Order {
    const RESOURCE: Resource = Resource::Orders;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn from_raw(raw: &Map<String, Value>) -> Option<Self> {
        let id = RecordId::from_json(raw.get("id")?)?;

        let status = match raw.get("status") {
            None | Some(Value::Null) => OrderStatus::default(),
            Some(Value::String(s)) => s.parse().ok()?,
            Some(_) => return None,
        };

        let created_at = text(raw, "createAt")
            .or_else(|| text(raw, "createdAt"))
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ts.with_timezone(&Utc));

        let items: Vec<LineItem> = raw
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(LineItem::from_raw).collect())
            .unwrap_or_default();

        let total = raw
            .get("total")
            .and_then(number)
            .unwrap_or_else(|| items.iter().map(LineItem::subtotal).sum());

        Some(Self {
            id,
            created_at,
            items,
            total,
            status,
            customer: raw.get("customerInfo").and_then(CustomerInfo::from_raw),
        })
    }
}

/// Partial product update; unset fields are left untouched by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    /// New display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New unit price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// New category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New brand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// New stock level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl ProductPatch {
    /// Whether the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Partial order update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    /// Replacement line items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
    /// New total
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    /// Replacement customer details
    #[serde(rename = "customerInfo", default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerInfo>,
}

impl OrderPatch {
    /// Patch that only moves the order to a new status
    #[inline]
    #[must_use]
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Non-empty string field
fn text<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Finite number, accepting numeric strings
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Non-negative count; fractional values are truncated
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(value: &Value) -> Option<u32> {
    let n = number(value)?;
    (n >= 0.0).then(|| n.min(f64::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn patches_serialize_only_set_fields() {
        let patch = ProductPatch {
            price: Some(990.0),
            stock: Some(3),
            ..ProductPatch::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"price": 990.0, "stock": 3}));
        assert!(ProductPatch::default().is_empty());

        assert_eq!(
            serde_json::to_value(OrderPatch::status(OrderStatus::Shipped)).unwrap(),
            json!({"status": "shipped"})
        );
    }

    #[test]
    fn product_defaults_are_applied() {
        let product = Product::from_raw(&object(json!({
            "id": 3, "name": "Kettle", "price": 590
        })))
        .unwrap();

        assert_eq!(product, Product::new(3, "Kettle", 590.0));
        assert_eq!(product.image, PLACEHOLDER_IMAGE);
        assert_eq!(product.image_alt, "Kettle");
        assert_eq!(product.currency, "THB");
    }

    #[test]
    fn serialized_products_read_back_through_from_raw() {
        let product = Product::new(81, "Fan", 990.0)
            .with_category("Appliances")
            .with_stock(4);
        let written = serde_json::to_value(&product).unwrap();
        assert_eq!(written["imageAlt"], "Fan");

        assert_eq!(Product::from_raw(&object(written)), Some(product));
    }

    #[test]
    fn product_requires_id_name_and_price() {
        assert!(Product::from_raw(&object(json!({"name": "x", "price": 1}))).is_none());
        assert!(Product::from_raw(&object(json!({"id": 1, "price": 1}))).is_none());
        assert!(Product::from_raw(&object(json!({"id": 1, "name": "x"}))).is_none());
        assert!(Product::from_raw(&object(json!({"id": 1, "name": "", "price": 1}))).is_none());
    }

    #[test]
    fn product_accepts_numeric_strings() {
        let product = Product::from_raw(&object(json!({
            "id": "81", "name": "Fan", "price": "1290.50", "stock": "7"
        })))
        .unwrap();
        assert_eq!(product.id, RecordId::Numeric(81));
        assert_eq!(product.price, 1290.5);
        assert_eq!(product.stock, 7);
    }

    #[test]
    fn order_total_falls_back_to_items() {
        let order = Order::from_raw(&object(json!({
            "id": "ORD-00003",
            "createAt": "2024-05-01T10:00:00Z",
            "items": [
                {"productId": 1, "qty": 2, "price": 100},
                {"productId": 2, "qty": 1, "price": 50},
                {"qty": 9}
            ]
        })))
        .unwrap();

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total, 250.0);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.created_at.is_some());
    }

    #[test]
    fn order_with_unknown_status_is_rejected() {
        assert!(Order::from_raw(&object(json!({"id": 90, "status": "lost"}))).is_none());
        assert!(Order::from_raw(&object(json!({"id": 90, "status": 3}))).is_none());
        let shipped = Order::from_raw(&object(json!({"id": 90, "status": "Shipped"}))).unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
    }

    #[test]
    fn order_serializes_wire_keys() {
        let order = Order::from_raw(&object(json!({
            "id": 120,
            "total": 10,
            "status": "success",
            "customerInfo": {"name": "A", "email": "a@b.co", "phone": "0812345678"}
        })))
        .unwrap();
        let wire = serde_json::to_value(&order).unwrap();
        assert_eq!(wire["status"], "success");
        assert_eq!(wire["customerInfo"]["name"], "A");
        assert!(wire.get("createAt").is_none());
    }

    #[test]
    fn newest_first_keeps_untimed_orders_last() {
        let mut orders: Vec<Order> = [
            json!({"id": 1}),
            json!({"id": 2, "createAt": "2024-01-01T00:00:00Z"}),
            json!({"id": 3, "createAt": "2024-03-01T00:00:00Z"}),
        ]
        .into_iter()
        .filter_map(|v| Order::from_raw(&object(v)))
        .collect();

        Order::newest_first(&mut orders);
        let ids: Vec<_> = orders.iter().map(|o| o.id.to_string()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }
}
