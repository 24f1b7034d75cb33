use canteen_auth::{Principal, Role};
use canteen_core::EntityId;

/// Principal context for a request (authenticated identity + role).
///
/// Inserted by the auth middleware from verified token claims.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: EntityId,
    role: Role,
}

impl PrincipalContext {
    pub fn new(user_id: EntityId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> EntityId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.user_id, self.role)
    }
}
