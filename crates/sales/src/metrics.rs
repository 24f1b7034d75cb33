//! Read-only dashboard aggregates. Derived on demand, never persisted.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Order, OrderStatus};

/// Number of entries returned by [`top_products`].
pub const TOP_PRODUCTS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub total_orders: usize,
    /// Distinct customer names across all orders (a coarse proxy).
    pub new_customers: usize,
    pub pending_orders: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProduct {
    pub name: String,
    /// Summed quantity over completed orders.
    pub sales: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPoint {
    pub name: String,
    pub sales: f64,
}

/// Aggregates saturate rather than overflow, so stored orders can never make
/// the dashboard unavailable.
pub fn dashboard_stats(orders: &[Order]) -> DashboardStats {
    let total_revenue = orders
        .iter()
        .filter(|o| o.is_completed())
        .fold(Decimal::ZERO, |acc, o| acc.saturating_add(o.total));
    let pending_orders = orders.iter().filter(|o| o.status == OrderStatus::Pending).count();
    let new_customers = orders
        .iter()
        .map(|o| o.customer_name.as_str())
        .collect::<HashSet<_>>()
        .len();

    DashboardStats {
        total_revenue,
        total_orders: orders.len(),
        new_customers,
        pending_orders,
    }
}

/// Best sellers by quantity over completed orders, at most `limit` entries.
///
/// Items are grouped by their snapshot name. Ties keep first-seen order.
pub fn top_products(orders: &[Order], limit: usize) -> Vec<TopProduct> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<TopProduct> = Vec::new();

    for line in orders.iter().filter(|o| o.is_completed()).flat_map(|o| &o.items) {
        match index.get(line.name.as_str()) {
            Some(&i) => totals[i].sales = totals[i].sales.saturating_add(line.quantity),
            None => {
                index.insert(line.name.as_str(), totals.len());
                totals.push(TopProduct {
                    name: line.name.clone(),
                    sales: line.quantity,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal quantities.
    totals.sort_by(|a, b| b.sales.cmp(&a.sales));
    totals.truncate(limit);
    totals
}

/// Weekly sales series for the trend chart.
///
/// This is a fixed placeholder series; it is not derived from orders.
pub fn weekly_sales() -> Vec<SalesPoint> {
    [
        ("Mon", 400.50),
        ("Tue", 300.25),
        ("Wed", 500.00),
        ("Thu", 280.75),
        ("Fri", 450.10),
        ("Sat", 600.90),
        ("Sun", 550.60),
    ]
    .into_iter()
    .map(|(name, sales)| SalesPoint {
        name: name.to_string(),
        sales,
    })
    .collect()
}
