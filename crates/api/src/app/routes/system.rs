use axum::{Json, extract::Extension, http::StatusCode};

use crate::app::dto::{PageView, WhoAmI};
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> Json<WhoAmI> {
    let pages = principal
        .principal()
        .pages()
        .into_iter()
        .map(|page| PageView {
            page,
            label: page.label(),
        })
        .collect();

    Json(WhoAmI {
        user_id: principal.user_id(),
        role: principal.role(),
        pages,
    })
}
