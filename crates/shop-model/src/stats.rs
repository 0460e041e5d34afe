//! Dashboard statistics
//!
//! Pure aggregations over merged orders and products for the admin
//! overview. Revenue always counts `success` orders only. Calendar
//! questions ("today", "this week") are answered in the offset of the `now`
//! argument, so callers decide which shop-local clock applies.

use crate::id::RecordId;
use crate::record::{Order, OrderStatus, Product};
use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::Serialize;
use std::collections::HashMap;

/// Stock level below which a product counts as low stock
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Order counters for the overview cards
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrderStats {
    /// All orders
    pub total_orders: usize,
    /// Sum of `success` order totals
    pub total_revenue: f64,
    /// Orders still pending
    pub pending_orders: usize,
    /// Failed orders
    pub failed_orders: usize,
    /// Percentage of orders that did not fail
    pub success_rate: f64,
}

impl OrderStats {
    /// Compute from a merged order list
    #[must_use]
    pub fn from_orders(orders: &[Order]) -> Self {
        let total_orders = orders.len();
        let failed_orders = count_status(orders, OrderStatus::Failed);
        #[allow(clippy::cast_precision_loss)]
        let success_rate = if total_orders == 0 {
            0.0
        } else {
            round1((total_orders - failed_orders) as f64 / total_orders as f64 * 100.0)
        };

        Self {
            total_orders,
            total_revenue: successful(orders).map(|o| o.total).sum(),
            pending_orders: count_status(orders, OrderStatus::Pending),
            failed_orders,
            success_rate,
        }
    }
}

/// Inventory counters for the overview cards
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InventoryStats {
    /// Number of products
    pub total_products: usize,
    /// Units across all products
    pub total_stock: u64,
    /// Σ price × stock
    pub total_value: f64,
    /// Products with no units left
    pub out_of_stock: usize,
    /// Products below [`LOW_STOCK_THRESHOLD`] but not out
    pub low_stock: usize,
}

impl InventoryStats {
    /// Compute from a merged product list
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        Self {
            total_products: products.len(),
            total_stock: products.iter().map(|p| u64::from(p.stock)).sum(),
            total_value: products.iter().map(|p| p.price * f64::from(p.stock)).sum(),
            out_of_stock: count_stock(products, StockStatus::OutOfStock),
            low_stock: count_stock(products, StockStatus::LowStock),
        }
    }
}

fn count_stock(products: &[Product], status: StockStatus) -> usize {
    products
        .iter()
        .filter(|p| StockStatus::of(p.stock) == status)
        .count()
}

/// Stock badge shown next to a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    /// No units left
    OutOfStock,
    /// Fewer than [`LOW_STOCK_THRESHOLD`] units
    LowStock,
    /// Plenty
    InStock,
}

impl StockStatus {
    /// Classify a stock level
    #[must_use]
    pub fn of(stock: u32) -> Self {
        match stock {
            0 => Self::OutOfStock,
            s if s < LOW_STOCK_THRESHOLD => Self::LowStock,
            _ => Self::InStock,
        }
    }
}

/// Sales figures relative to a reference instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalesKpis {
    /// Revenue from today's successful orders
    pub todays_sales: f64,
    /// Revenue from successful orders in the current ISO week
    pub this_week_sales: f64,
    /// Count of today's successful orders
    pub todays_successful_orders: usize,
}

impl SalesKpis {
    /// Compute for the day and week containing `now`
    #[must_use]
    pub fn compute(orders: &[Order], now: DateTime<FixedOffset>) -> Self {
        let today: Vec<&Order> = successful(orders)
            .filter(|o| local(o, now).is_some_and(|ts| ts.date_naive() == now.date_naive()))
            .collect();
        let this_week_sales = successful(orders)
            .filter(|o| local(o, now).is_some_and(|ts| ts.iso_week() == now.iso_week()))
            .map(|o| o.total)
            .sum();

        Self {
            todays_sales: today.iter().map(|o| o.total).sum(),
            this_week_sales,
            todays_successful_orders: today.len(),
        }
    }
}

/// Order volume per hour of the current day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyActivity {
    /// Order count per hour, index 0..24
    pub orders: [usize; 24],
    /// Successful revenue per hour
    pub sales: [f64; 24],
    /// Busiest hours in ascending order; empty when there were no orders
    pub peak_hours: Vec<u32>,
    /// Mean orders per hour across the whole day
    pub average_per_hour: f64,
    /// How far the peak is above the average, in whole percent
    pub peak_vs_average: i64,
}

impl HourlyActivity {
    /// Bucket today's orders by local hour
    #[must_use]
    pub fn compute(orders: &[Order], now: DateTime<FixedOffset>) -> Self {
        let mut counts = [0usize; 24];
        let mut sales = [0f64; 24];

        for order in orders {
            let Some(ts) = local(order, now) else { continue };
            if ts.date_naive() != now.date_naive() {
                continue;
            }
            let hour = ts.hour() as usize;
            counts[hour] += 1;
            if order.status == OrderStatus::Success {
                sales[hour] += order.total;
            }
        }

        let max = counts.iter().copied().max().unwrap_or(0);
        let peak_hours = (0u32..24)
            .filter(|h| max > 0 && counts[*h as usize] == max)
            .collect();

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let (average_per_hour, peak_vs_average) = {
            let average = counts.iter().sum::<usize>() as f64 / 24.0;
            let lift = if max > 0 && average > 0.0 {
                ((max as f64 - average) / average * 100.0).round() as i64
            } else {
                0
            };
            (average, lift)
        };

        Self {
            orders: counts,
            sales,
            peak_hours,
            average_per_hour,
            peak_vs_average,
        }
    }
}

/// Best-selling product by units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProduct {
    /// Product identifier
    pub product_id: RecordId,
    /// Display name, or `Product #<id>` when the product is unknown
    pub name: String,
    /// Units sold
    pub units: u64,
    /// Revenue from those units
    pub revenue: f64,
}

/// Top `limit` products by units sold in successful orders
#[must_use]
pub fn top_products(orders: &[Order], products: &[Product], limit: usize) -> Vec<TopProduct> {
    let names: HashMap<&RecordId, &str> =
        products.iter().map(|p| (&p.id, p.name.as_str())).collect();
    let mut tally: Vec<TopProduct> = Vec::new();
    let mut index: HashMap<RecordId, usize> = HashMap::new();

    for item in successful(orders).flat_map(|o| &o.items) {
        let slot = *index.entry(item.product_id.clone()).or_insert_with(|| {
            tally.push(TopProduct {
                product_id: item.product_id.clone(),
                name: names
                    .get(&item.product_id)
                    .map_or_else(|| format!("Product #{}", item.product_id), |n| (*n).to_string()),
                units: 0,
                revenue: 0.0,
            });
            tally.len() - 1
        });
        tally[slot].units += u64::from(item.qty);
        tally[slot].revenue += item.subtotal();
    }

    tally.sort_by(|a, b| b.units.cmp(&a.units));
    tally.truncate(limit);
    tally
}

fn successful(orders: &[Order]) -> impl Iterator<Item = &Order> {
    orders.iter().filter(|o| o.status == OrderStatus::Success)
}

fn count_status(orders: &[Order], status: OrderStatus) -> usize {
    orders.iter().filter(|o| o.status == status).count()
}

fn local(order: &Order, now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    order.created_at.map(|ts| ts.with_timezone(now.offset()))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LineItem;
    use chrono::{TimeZone, Utc};

    fn order(id: i64, status: OrderStatus, total: f64, at: Option<&str>) -> Order {
        Order {
            id: RecordId::Numeric(id),
            created_at: at.map(|s| DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)),
            items: vec![LineItem { product_id: RecordId::Numeric(1), qty: 2, price: total / 2.0 }],
            total,
            status,
            customer: None,
        }
    }

    fn bangkok_noon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 15, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn revenue_counts_success_only() {
        let orders = vec![
            order(1, OrderStatus::Success, 100.0, None),
            order(2, OrderStatus::Pending, 50.0, None),
            order(3, OrderStatus::Failed, 70.0, None),
            order(4, OrderStatus::Success, 30.0, None),
        ];
        let stats = OrderStats::from_orders(&orders);
        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.total_revenue, 130.0);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.failed_orders, 1);
        assert_eq!(stats.success_rate, 75.0);
    }

    #[test]
    fn empty_order_stats() {
        let stats = OrderStats::from_orders(&[]);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.total_revenue, 0.0);
    }

    #[test]
    fn inventory_and_stock_status() {
        let products = vec![
            Product::new(1, "a", 10.0).with_stock(3),
            Product::new(2, "b", 5.0).with_stock(20),
            Product::new(3, "c", 8.0).with_stock(0),
        ];
        let stats = InventoryStats::from_products(&products);
        assert_eq!(stats.total_stock, 23);
        assert_eq!(stats.total_value, 130.0);
        assert_eq!(stats.out_of_stock, 1);
        assert_eq!(stats.low_stock, 1);

        assert_eq!(StockStatus::of(0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::of(9), StockStatus::LowStock);
        assert_eq!(StockStatus::of(10), StockStatus::InStock);
    }

    #[test]
    fn kpis_use_local_calendar() {
        // 2024-05-14T20:00Z is 03:00 on the 15th in UTC+7
        let orders = vec![
            order(1, OrderStatus::Success, 100.0, Some("2024-05-14T20:00:00Z")),
            order(2, OrderStatus::Success, 40.0, Some("2024-05-13T02:00:00Z")),
            order(3, OrderStatus::Pending, 999.0, Some("2024-05-15T01:00:00Z")),
            order(4, OrderStatus::Success, 5.0, Some("2024-05-01T01:00:00Z")),
        ];
        let kpis = SalesKpis::compute(&orders, bangkok_noon());
        assert_eq!(kpis.todays_sales, 100.0);
        assert_eq!(kpis.todays_successful_orders, 1);
        assert_eq!(kpis.this_week_sales, 140.0);
    }

    #[test]
    fn hourly_peaks() {
        let orders = vec![
            order(1, OrderStatus::Success, 10.0, Some("2024-05-15T02:10:00Z")),
            order(2, OrderStatus::Pending, 10.0, Some("2024-05-15T02:40:00Z")),
            order(3, OrderStatus::Success, 10.0, Some("2024-05-15T04:00:00Z")),
        ];
        let activity = HourlyActivity::compute(&orders, bangkok_noon());
        assert_eq!(activity.orders[9], 2);
        assert_eq!(activity.sales[9], 10.0);
        assert_eq!(activity.peak_hours, vec![9]);
        assert_eq!(activity.peak_vs_average, 1500);

        let quiet = HourlyActivity::compute(&[], bangkok_noon());
        assert!(quiet.peak_hours.is_empty());
        assert_eq!(quiet.peak_vs_average, 0);
    }

    #[test]
    fn top_products_by_units() {
        let mut big = order(1, OrderStatus::Success, 0.0, None);
        big.items = vec![
            LineItem { product_id: RecordId::Numeric(1), qty: 1, price: 10.0 },
            LineItem { product_id: RecordId::Numeric(2), qty: 5, price: 2.0 },
        ];
        let mut failed = order(2, OrderStatus::Failed, 0.0, None);
        failed.items = vec![LineItem { product_id: RecordId::Numeric(1), qty: 50, price: 1.0 }];

        let products = vec![Product::new(2, "Widget", 2.0)];
        let top = top_products(&[big, failed], &products, 5);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Widget");
        assert_eq!(top[0].units, 5);
        assert_eq!(top[1].name, "Product #1");
        assert_eq!(top[1].revenue, 10.0);
    }
}
