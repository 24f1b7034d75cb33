//! `canteen-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how to
//! hash passwords, mint/verify bearer tokens and decide whether a role may reach
//! a page, but not where users are stored.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod navigation;
pub mod password;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, Principal, authorize, require_role};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtIssuer, Hs256JwtValidator, JwtValidator};
pub use navigation::Page;
pub use password::{PasswordError, hash_password, verify_password};
pub use roles::Role;
pub use user::{User, UserProfile, UserStatus};
