use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
};
use tracing::info;

use canteen_parties::{Supplier, SupplierDraft, SupplierPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_supplier).get(list_suppliers))
        .route("/:id", put(update_supplier).delete(delete_supplier))
}

pub async fn create_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SupplierDraft>, JsonRejection>,
) -> Result<Response, Response> {
    let draft = dto::body(body)?;
    let supplier = Supplier::create(draft).map_err(errors::domain_error_to_response)?;
    let supplier = services
        .suppliers
        .create(supplier)
        .await
        .map_err(errors::service_error_to_response)?;
    info!(supplier_id = %supplier.id, "supplier registered");
    Ok((StatusCode::CREATED, Json(supplier)).into_response())
}

pub async fn list_suppliers(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, Response> {
    let suppliers = services
        .suppliers
        .list()
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(suppliers).into_response())
}

pub async fn update_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<SupplierPatch>, JsonRejection>,
) -> Result<Response, Response> {
    let id = errors::parse_id(&id)?;
    let patch = dto::body(body)?;
    let supplier = services
        .suppliers
        .update_with(id, Box::new(move |s: &mut Supplier| s.apply_patch(patch)))
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(supplier).into_response())
}

pub async fn delete_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let id = errors::parse_id(&id)?;
    services
        .suppliers
        .delete(id)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
