use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/stats", get(stats))
        .route("/sales", get(sales))
        .route("/top-products", get(top_products))
}

pub async fn stats(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, Response> {
    let stats = services
        .orders
        .stats()
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(stats).into_response())
}

/// Weekly trend series (fixed placeholder).
pub async fn sales(Extension(services): Extension<Arc<AppServices>>) -> Response {
    Json(services.orders.weekly_sales()).into_response()
}

pub async fn top_products(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, Response> {
    let top = services
        .orders
        .top_products()
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(top).into_response())
}
