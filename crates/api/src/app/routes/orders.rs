use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
};
use chrono::Utc;
use tracing::warn;

use canteen_core::DomainError;
use canteen_infra::{NewOrder, ServiceError};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", put(update_order_status).delete(delete_order))
}

/// Display name recorded as the order's cashier.
async fn cashier_name(services: &AppServices, principal: &PrincipalContext) -> Result<String, Response> {
    match services.credentials.get_user(principal.user_id()).await {
        Ok(profile) => Ok(profile.name),
        Err(ServiceError::Domain(DomainError::NotFound(_))) => {
            warn!(user_id = %principal.user_id(), "token subject has no account; recording id as cashier");
            Ok(principal.user_id().to_string())
        }
        Err(e) => Err(errors::service_error_to_response(e)),
    }
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> Result<Response, Response> {
    let req = dto::body(body)?;
    let cashier = cashier_name(&services, &principal).await?;
    let order = services
        .orders
        .create_order(req, &cashier, Utc::now())
        .await
        .map_err(errors::service_error_to_response)?;
    Ok((StatusCode::CREATED, Json(order)).into_response())
}

pub async fn list_orders(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, Response> {
    let orders = services
        .orders
        .list_orders()
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(orders).into_response())
}

pub async fn update_order_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::OrderStatusRequest>, JsonRejection>,
) -> Result<Response, Response> {
    let id = errors::parse_id(&id)?;
    let req = dto::body(body)?;
    let order = services
        .orders
        .update_status(id, req.status)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(order).into_response())
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let id = errors::parse_id(&id)?;
    services
        .orders
        .delete_order(id)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
