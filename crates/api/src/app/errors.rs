use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use canteen_core::{DomainError, EntityId};
use canteen_infra::ServiceError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_state", msg),
        e @ DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", e.to_string()),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthenticated(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthenticated", msg),
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => {
            error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error")
        }
        ServiceError::Internal(msg) => {
            error!(error = %msg, "internal failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error")
        }
    }
}

/// Malformed or mistyped request bodies are reported as invalid input.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_input", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_id(id: &str) -> Result<EntityId, axum::response::Response> {
    id.parse()
        .map_err(|e: DomainError| domain_error_to_response(e))
}
