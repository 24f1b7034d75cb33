//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage backend selection and service construction
//! - `routes/`: HTTP routes + handlers (one file per collection)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent `{error, message}` error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use canteen_infra::StoreError;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> Result<Router, StoreError> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(build_router(config, services))
}

/// Build the router over already-constructed services.
pub fn build_router(config: &ApiConfig, services: Arc<services::AppServices>) -> Router {
    let jwt = Arc::new(canteen_auth::Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState {
        jwt,
        policy: config.role_policy,
    };

    // Protected routes: require a valid bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(config.request_timeout)),
        )
}
