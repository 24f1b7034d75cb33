use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use canteen_infra::{LoginRequest, SignupRequest};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Response, Response> {
    let req = dto::body(body)?;
    let session = services
        .credentials
        .signup(req, Utc::now())
        .await
        .map_err(errors::service_error_to_response)?;
    Ok((StatusCode::CREATED, Json(session)).into_response())
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, Response> {
    let req = dto::body(body)?;
    let session = services
        .credentials
        .login(req, Utc::now())
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(Json(session).into_response())
}
