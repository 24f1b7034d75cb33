use serde::Serialize;
use thiserror::Error;

use canteen_core::EntityId;

use crate::{Page, Role};

/// A fully resolved principal for authorization decisions.
///
/// Construction of this object is intentionally decoupled from storage and
/// transport: the API derives it from verified token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: EntityId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: EntityId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Pages this principal may navigate to.
    pub fn pages(&self) -> Vec<Page> {
        Page::visible_to(self.role)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' may not access {page:?}")]
    PageForbidden { role: Role, page: Page },

    #[error("forbidden: role '{role}' does not hold '{required}'")]
    RoleForbidden { role: Role, required: Role },
}

/// Authorize a principal for a navigation/action target.
///
/// - No IO
/// - No panics
/// - Pure policy check against the static page table
pub fn authorize(principal: &Principal, page: Page) -> Result<(), AuthzError> {
    if page.allowed_roles().contains(&principal.role) {
        Ok(())
    } else {
        Err(AuthzError::PageForbidden {
            role: principal.role,
            page,
        })
    }
}

/// Require that the principal's role inherits `required` through the hierarchy.
pub fn require_role(principal: &Principal, required: Role) -> Result<(), AuthzError> {
    if principal.role.includes(required) {
        Ok(())
    } else {
        Err(AuthzError::RoleForbidden {
            role: principal.role,
            required,
        })
    }
}
