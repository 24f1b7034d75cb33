//! HS256 bearer token signing and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;

use canteen_core::EntityId;

use crate::{JwtClaims, Role, TokenValidationError, validate_claims};

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// Shared-secret (HS256) token validator.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks are done by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation).map_err(|e| {
            debug!(error = %e, "bearer token rejected");
            TokenValidationError::Malformed(e.to_string())
        })?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[derive(Debug, Error)]
#[error("failed to sign token: {0}")]
pub struct TokenSigningError(String);

/// Shared-secret (HS256) token issuer.
pub struct Hs256JwtIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl Hs256JwtIssuer {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
            ttl,
        }
    }

    /// Mint a token for `user_id` acting as `role`, valid from `now` for the
    /// configured lifetime.
    pub fn issue(&self, user_id: EntityId, role: Role, now: DateTime<Utc>) -> Result<String, TokenSigningError> {
        let claims = JwtClaims {
            sub: user_id,
            role,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| TokenSigningError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_token_round_trips_identity_and_role() {
        let issuer = Hs256JwtIssuer::new(SECRET, Duration::hours(24));
        let validator = Hs256JwtValidator::new(SECRET);
        let user_id = EntityId::new();
        let now = Utc::now();

        let token = issuer.issue(user_id, Role::Manager, now).unwrap();
        let claims = validator.validate(&token, now + Duration::seconds(1)).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Manager);
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = Hs256JwtIssuer::new(SECRET, Duration::minutes(5));
        let validator = Hs256JwtValidator::new(SECRET);
        let now = Utc::now();

        let token = issuer.issue(EntityId::new(), Role::Staff, now).unwrap();
        let err = validator.validate(&token, now + Duration::minutes(6)).unwrap_err();
        assert_eq!(err, TokenValidationError::Expired);
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let issuer = Hs256JwtIssuer::new("other-secret", Duration::hours(1));
        let validator = Hs256JwtValidator::new(SECRET);
        let now = Utc::now();

        let token = issuer.issue(EntityId::new(), Role::Admin, now).unwrap();
        assert!(matches!(
            validator.validate(&token, now),
            Err(TokenValidationError::Malformed(_))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let validator = Hs256JwtValidator::new(SECRET);
        assert!(matches!(
            validator.validate("not.a.token", Utc::now()),
            Err(TokenValidationError::Malformed(_))
        ));
    }
}
