use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::Utc;
use tracing::info;

use canteen_products::{Product, ProductDraft, ProductPatch};

use crate::app::dto::{self, ProductView};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/:id/stock", patch(adjust_stock))
}

fn view(product: Product) -> ProductView {
    ProductView::new(product, Utc::now().date_naive())
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> Result<Response, Response> {
    let draft = dto::body(body)?;
    let product = Product::create(draft).map_err(errors::domain_error_to_response)?;
    let product = services
        .products
        .create(product)
        .await
        .map_err(errors::service_error_to_response)?;
    info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(view(product))).into_response())
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, Response> {
    let products = services
        .products
        .list()
        .await
        .map_err(errors::service_error_to_response)?;
    let today = Utc::now().date_naive();
    let items: Vec<ProductView> = products.into_iter().map(|p| ProductView::new(p, today)).collect();
    Ok(Json(items).into_response())
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let id = errors::parse_id(&id)?;
    let product = services
        .products
        .get(id)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(view(product)).into_response())
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Response, Response> {
    let id = errors::parse_id(&id)?;
    let patch = dto::body(body)?;
    let product = services
        .products
        .update_with(id, Box::new(move |p: &mut Product| p.apply_patch(patch)))
        .await
        .map_err(errors::service_error_to_response)?;
    info!(product_id = %id, "product updated");
    Ok(Json(view(product)).into_response())
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let id = errors::parse_id(&id)?;
    services
        .products
        .delete(id)
        .await
        .map_err(errors::service_error_to_response)?;
    info!(product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Signed stock delta: positive restocks, negative records an outflow.
pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::StockChangeRequest>, JsonRejection>,
) -> Result<Response, Response> {
    let id = errors::parse_id(&id)?;
    let req = dto::body(body)?;
    let product = services
        .inventory
        .adjust(id, req.change)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(view(product)).into_response())
}
