use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod dashboard;
pub mod discounts;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod system;
pub mod users;

/// Routes reachable without a bearer token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/users", users::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/suppliers", suppliers::router())
        .nest("/discounts", discounts::router())
        .nest("/dashboard", dashboard::router())
}
