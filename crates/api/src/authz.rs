//! Route-level authorization policy.
//!
//! `Permissive` only requires a valid token (the deployed behaviour).
//! `Navigation` additionally requires the role set of the client page that
//! owns the route group.

use std::str::FromStr;

use axum::http::Method;

use canteen_auth::{AuthzError, Page, Role, authorize, require_role};

use crate::context::PrincipalContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutePolicy {
    #[default]
    Permissive,
    Navigation,
}

impl FromStr for RoutePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "navigation" => Ok(Self::Navigation),
            other => Err(format!("unknown role policy `{other}` (expected permissive or navigation)")),
        }
    }
}

/// Page guarding a protected route, if any.
///
/// Reading the catalog is part of taking an order, so cashiers may `GET`
/// products.
fn page_for(method: &Method, path: &str) -> Option<Page> {
    let mut segments = path.trim_start_matches('/').split('/');
    let group = segments.next()?;
    let rest: Vec<&str> = segments.collect();

    match group {
        "dashboard" => Some(Page::Dashboard),
        "orders" => Some(if *method == Method::POST { Page::NewOrder } else { Page::Orders }),
        "products" if rest.last() == Some(&"stock") => Some(Page::Inventory),
        "products" if *method == Method::GET => Some(Page::NewOrder),
        "products" => Some(Page::Products),
        "suppliers" => Some(Page::Suppliers),
        "discounts" => Some(Page::Discounts),
        "users" => Some(Page::Users),
        _ => None,
    }
}

/// Check a request against the configured policy.
pub fn check_route(
    policy: RoutePolicy,
    principal: &PrincipalContext,
    method: &Method,
    path: &str,
) -> Result<(), AuthzError> {
    if policy == RoutePolicy::Permissive {
        return Ok(());
    }
    match page_for(method, path) {
        Some(Page::Users) => require_role(&principal.principal(), Role::Admin),
        Some(page) => authorize(&principal.principal(), page),
        None => Ok(()),
    }
}
