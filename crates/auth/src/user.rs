//! User account record (credential store document).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use canteen_core::{DomainError, DomainResult, Entity, EntityId, error::require_non_blank};

use crate::Role;

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserStatus {
    /// User is active and can authenticate.
    #[default]
    Active,
    /// User is disabled and cannot authenticate.
    Inactive,
}

/// Persisted user record.
///
/// Holds the password hash, so this type must never be returned to clients;
/// use [`User::profile`] for any outward representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
    pub last_login: DateTime<Utc>,
}

/// Outward representation of a user (no credentials).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub last_login: DateTime<Utc>,
}

impl User {
    /// Build a new account from already-hashed credentials.
    pub fn new(
        name: &str,
        email: &str,
        password_hash: String,
        role: Role,
        status: UserStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        require_non_blank("name", name)?;
        let email = normalize_email(email)?;
        Ok(Self {
            id: EntityId::new(),
            name: name.trim().to_string(),
            email,
            password_hash,
            role,
            status,
            last_login: now,
        })
    }

    pub fn can_log_in(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login = now;
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            status: self.status,
            last_login: self.last_login,
        }
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Canonical form of an email address used for uniqueness checks.
pub fn normalize_email(email: &str) -> DomainResult<String> {
    require_non_blank("email", email)?;
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(DomainError::validation("email must look like name@domain")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("Ada", " Ada@Example.com ", "hash".into(), Role::Cashier, UserStatus::Active, Utc::now())
            .unwrap()
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(user().email, "ada@example.com");
    }

    #[test]
    fn malformed_email_is_rejected() {
        let err = User::new("Ada", "nope", "h".into(), Role::Staff, UserStatus::Active, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(User::new(" ", "a@b.c", "h".into(), Role::Staff, UserStatus::Active, Utc::now()).is_err());
    }

    #[test]
    fn profile_never_serializes_the_hash() {
        let json = serde_json::to_value(user().profile()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "Cashier");
        assert!(json.get("lastLogin").is_some());
    }

    #[test]
    fn inactive_users_cannot_log_in() {
        let mut u = user();
        assert!(u.can_log_in());
        u.status = UserStatus::Inactive;
        assert!(!u.can_log_in());
    }
}
