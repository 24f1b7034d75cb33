//! Credential store: signup, login and user administration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use canteen_auth::user::normalize_email;
use canteen_auth::{
    Hs256JwtIssuer, Role, User, UserProfile, UserStatus, hash_password, verify_password,
};
use canteen_core::{DomainError, EntityId, error::require_non_blank};

use crate::error::{ServiceError, ServiceResult};
use crate::repository::{Filter, Repository};

/// Message for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin-side account creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub status: Option<UserStatus>,
}

/// Partial user edit; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

/// Token plus the profile it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

pub struct CredentialStore {
    users: Arc<dyn Repository<User>>,
    issuer: Hs256JwtIssuer,
    // Held across count + insert so only one signup can see an empty store.
    signup_lock: Mutex<()>,
}

fn hash(password: &str) -> ServiceResult<String> {
    hash_password(password).map_err(|e| ServiceError::Internal(e.to_string()))
}

fn rejected() -> ServiceError {
    DomainError::unauthenticated(INVALID_CREDENTIALS).into()
}

impl CredentialStore {
    pub fn new(users: Arc<dyn Repository<User>>, issuer: Hs256JwtIssuer) -> Self {
        Self {
            users,
            issuer,
            signup_lock: Mutex::new(()),
        }
    }

    /// Register a new account. The first account in an empty store becomes
    /// Admin; every later one is a Cashier.
    pub async fn signup(&self, req: SignupRequest, now: DateTime<Utc>) -> ServiceResult<Session> {
        require_non_blank("name", &req.name)?;
        require_non_blank("email", &req.email)?;
        require_non_blank("password", &req.password)?;
        let email = normalize_email(&req.email)?;
        let password_hash = hash(&req.password)?;

        let _guard = self.signup_lock.lock().await;
        self.ensure_email_free(&email).await?;

        let role = if self.users.count().await? == 0 {
            Role::Admin
        } else {
            Role::Cashier
        };
        let user = User::new(&req.name, &email, password_hash, role, UserStatus::Active, now)?;
        let user = self.users.create(user).await?;
        info!(user_id = %user.id, role = %user.role, "user signed up");

        self.session_for(&user, now)
    }

    pub async fn login(&self, req: LoginRequest, now: DateTime<Utc>) -> ServiceResult<Session> {
        let Ok(email) = normalize_email(&req.email) else {
            return Err(rejected());
        };
        let Some(user) = self.users.find_one(Filter::eq("email", email)).await? else {
            warn!("login rejected: unknown email");
            return Err(rejected());
        };

        if verify_password(&req.password, &user.password_hash).is_err() {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(rejected());
        }
        if !user.can_log_in() {
            warn!(user_id = %user.id, "login rejected: account inactive");
            return Err(rejected());
        }

        let user = self
            .users
            .update_with(
                user.id,
                Box::new(move |u: &mut User| {
                    u.record_login(now);
                    Ok(())
                }),
            )
            .await?;
        info!(user_id = %user.id, "user logged in");

        self.session_for(&user, now)
    }

    pub async fn list_users(&self) -> ServiceResult<Vec<UserProfile>> {
        Ok(self.users.list().await?.iter().map(User::profile).collect())
    }

    pub async fn get_user(&self, id: EntityId) -> ServiceResult<UserProfile> {
        Ok(self.users.get(id).await?.profile())
    }

    /// Create an account on behalf of an administrator.
    pub async fn create_user(&self, req: NewUser, now: DateTime<Utc>) -> ServiceResult<UserProfile> {
        require_non_blank("password", &req.password)?;
        let email = normalize_email(&req.email)?;
        self.ensure_email_free(&email).await?;

        let user = User::new(
            &req.name,
            &email,
            hash(&req.password)?,
            req.role.unwrap_or(Role::Staff),
            req.status.unwrap_or_default(),
            now,
        )?;
        let user = self.users.create(user).await?;
        info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user.profile())
    }

    pub async fn update_user(&self, id: EntityId, patch: UserPatch) -> ServiceResult<UserProfile> {
        if let Some(name) = &patch.name {
            require_non_blank("name", name)?;
        }
        let email = patch.email.as_deref().map(normalize_email).transpose()?;
        let password_hash = match &patch.password {
            Some(password) => {
                require_non_blank("password", password)?;
                Some(hash(password)?)
            }
            None => None,
        };

        let user = self
            .users
            .update_with(
                id,
                Box::new(move |u: &mut User| {
                    if let Some(name) = patch.name {
                        u.name = name.trim().to_string();
                    }
                    if let Some(email) = email {
                        u.email = email;
                    }
                    if let Some(hash) = password_hash {
                        u.password_hash = hash;
                    }
                    if let Some(role) = patch.role {
                        u.role = role;
                    }
                    if let Some(status) = patch.status {
                        u.status = status;
                    }
                    Ok(())
                }),
            )
            .await?;
        info!(user_id = %user.id, "user updated");
        Ok(user.profile())
    }

    pub async fn delete_user(&self, id: EntityId) -> ServiceResult<()> {
        self.users.delete(id).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    async fn ensure_email_free(&self, email: &str) -> ServiceResult<()> {
        if self.users.find_one(Filter::eq("email", email)).await?.is_some() {
            return Err(DomainError::conflict("email already registered").into());
        }
        Ok(())
    }

    fn session_for(&self, user: &User, now: DateTime<Utc>) -> ServiceResult<Session> {
        let token = self
            .issuer
            .issue(user.id, user.role, now)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(Session {
            token,
            user: user.profile(),
        })
    }
}
