use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
};
use tracing::info;

use canteen_products::{Discount, DiscountDraft, DiscountPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_discount).get(list_discounts))
        .route("/:id", put(update_discount).delete(delete_discount))
}

pub async fn create_discount(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<DiscountDraft>, JsonRejection>,
) -> Result<Response, Response> {
    let draft = dto::body(body)?;
    let discount = Discount::create(draft).map_err(errors::domain_error_to_response)?;
    let discount = services
        .discounts
        .create(discount)
        .await
        .map_err(errors::service_error_to_response)?;
    info!(discount_id = %discount.id, code = %discount.code, "discount created");
    Ok((StatusCode::CREATED, Json(discount)).into_response())
}

pub async fn list_discounts(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, Response> {
    let discounts = services
        .discounts
        .list()
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(discounts).into_response())
}

pub async fn update_discount(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<DiscountPatch>, JsonRejection>,
) -> Result<Response, Response> {
    let id = errors::parse_id(&id)?;
    let patch = dto::body(body)?;
    let discount = services
        .discounts
        .update_with(id, Box::new(move |d: &mut Discount| d.apply_patch(patch)))
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(discount).into_response())
}

pub async fn delete_discount(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let id = errors::parse_id(&id)?;
    services
        .discounts
        .delete(id)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
