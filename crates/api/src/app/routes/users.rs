use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
};
use chrono::Utc;

use canteen_infra::{NewUser, UserPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", put(update_user).delete(delete_user))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<Response, Response> {
    let req = dto::body(body)?;
    let user = services
        .credentials
        .create_user(req, Utc::now())
        .await
        .map_err(errors::service_error_to_response)?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, Response> {
    let users = services
        .credentials
        .list_users()
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(users).into_response())
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Response, Response> {
    let id = errors::parse_id(&id)?;
    let patch = dto::body(body)?;
    let user = services
        .credentials
        .update_user(id, patch)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(user).into_response())
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let id = errors::parse_id(&id)?;
    services
        .credentials
        .delete_user(id)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
