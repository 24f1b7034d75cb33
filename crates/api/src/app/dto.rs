use axum::Json;
use axum::extract::rejection::JsonRejection;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use canteen_auth::{Page, Role};
use canteen_core::EntityId;
use canteen_products::{Product, StockStatus};
use canteen_sales::OrderStatus;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// `PATCH /products/:id/stock`
#[derive(Debug, Deserialize)]
pub struct StockChangeRequest {
    pub change: i64,
}

/// `PUT /orders/:id`: status is the only mutable field.
#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub status: OrderStatus,
}

// -------------------------
// Response DTOs
// -------------------------

/// Product plus its derived inventory status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stock_status: StockStatus,
}

impl ProductView {
    pub fn new(product: Product, today: NaiveDate) -> Self {
        let stock_status = product.stock_status(today);
        Self { product, stock_status }
    }
}

#[derive(Debug, Serialize)]
pub struct PageView {
    pub page: Page,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub user_id: EntityId,
    pub role: Role,
    pub pages: Vec<PageView>,
}

/// Unwrap a JSON body, reporting decode failures as invalid input.
pub fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    body.map(|Json(v)| v).map_err(errors::json_rejection_to_response)
}
