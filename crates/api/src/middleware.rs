use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::warn;

use canteen_auth::JwtValidator;

use crate::app::errors::json_error;
use crate::authz::{RoutePolicy, check_route};
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub policy: RoutePolicy,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())
        .ok_or_else(|| json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "missing bearer token"))?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        warn!(reason = %e, "bearer token rejected");
        json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "invalid or expired token")
    })?;

    let principal = PrincipalContext::new(claims.sub, claims.role);
    if let Err(e) = check_route(state.policy, &principal, req.method(), req.uri().path()) {
        warn!(user_id = %principal.user_id(), role = %principal.role(), path = req.uri().path(), "route forbidden");
        return Err(json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()));
    }

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
