//! Cart and checkout
//!
//! The cart holds product snapshots and quantities; checkout validates the
//! buyer's details and turns the cart into a pending order for the live
//! backend.

use crate::id::RecordId;
use crate::record::{CustomerInfo, LineItem, Order, OrderStatus, Product};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{9,10}$").expect("valid regex"));

/// Checkout validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    /// Nothing to order
    #[error("cart is empty")]
    EmptyCart,

    /// Required customer field left blank
    #[error("missing customer {0}")]
    MissingField(&'static str),

    /// Email does not look like an address
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// Phone is not 9-10 digits
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),
}

/// One cart line
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Product snapshot taken when added
    pub product: Product,
    /// Units
    pub quantity: u32,
}

/// Shopping cart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create empty cart
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add units of a product, merging with an existing line
    pub fn add(&mut self, product: Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.lines.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine { product, quantity }),
        }
    }

    /// Set the quantity of a line; zero removes it
    pub fn set_quantity(&mut self, id: &RecordId, quantity: u32) {
        if quantity == 0 {
            self.remove(id);
        } else if let Some(line) = self.lines.iter_mut().find(|l| &l.product.id == id) {
            line.quantity = quantity;
        }
    }

    /// Remove a line
    pub fn remove(&mut self, id: &RecordId) {
        self.lines.retain(|l| &l.product.id != id);
    }

    /// Empty the cart
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Σ price × quantity
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.product.price * f64::from(l.quantity))
            .sum()
    }

    /// Total units
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Whether the cart has no lines
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Validate buyer details
///
/// # Errors
/// The first failing rule: blank name/email/phone, malformed email, or a
/// phone that is not 9-10 digits once spaces and dashes are removed.
pub fn validate_customer(customer: &CustomerInfo) -> Result<(), CheckoutError> {
    for (field, value) in [
        ("name", &customer.name),
        ("email", &customer.email),
        ("phone", &customer.phone),
    ] {
        if value.trim().is_empty() {
            return Err(CheckoutError::MissingField(field));
        }
    }

    if !EMAIL.is_match(customer.email.trim()) {
        return Err(CheckoutError::InvalidEmail(customer.email.clone()));
    }

    let digits: String = customer
        .phone
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();
    if !PHONE.is_match(&digits) {
        return Err(CheckoutError::InvalidPhone(customer.phone.clone()));
    }

    Ok(())
}

/// Turn a cart into a pending order
///
/// The order id is the creation time in milliseconds, which always lands in
/// the live (editable) id range.
///
/// # Errors
/// [`CheckoutError`] when the cart is empty or the customer is invalid.
pub fn build_order(
    cart: &Cart,
    customer: CustomerInfo,
    now: DateTime<Utc>,
) -> Result<Order, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    validate_customer(&customer)?;

    Ok(Order {
        id: RecordId::Numeric(now.timestamp_millis()),
        created_at: Some(now),
        items: cart
            .lines()
            .iter()
            .map(|l| LineItem {
                product_id: l.product.id.clone(),
                qty: l.quantity,
                price: l.product.price,
            })
            .collect(),
        total: cart.total(),
        status: OrderStatus::Pending,
        customer: Some(customer),
    })
}
