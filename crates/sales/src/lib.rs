//! Sales domain module: orders and the dashboard metrics derived from them.
//!
//! Pure domain logic (no IO, no HTTP, no storage).

pub mod metrics;
pub mod order;

pub use metrics::{DashboardStats, SalesPoint, TOP_PRODUCTS_LIMIT, TopProduct, dashboard_stats, top_products, weekly_sales};
pub use order::{MAX_LINE_QUANTITY, Order, OrderItemRequest, OrderLine, OrderStatus};
