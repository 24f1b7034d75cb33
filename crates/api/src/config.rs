//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `JWT_SECRET` - HS256 signing secret for bearer tokens
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 3001)
//! - `TOKEN_TTL_SECS` - Token lifetime (default: 86400, one day)
//! - `ROLE_POLICY` - `permissive` or `navigation` (default: permissive)
//! - `REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `DATABASE_URL` - Postgres document store (requires the `postgres` feature)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

use crate::authz::RoutePolicy;

/// One year.
const MAX_TOKEN_TTL_SECS: u64 = 365 * 86_400;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub token_ttl: Duration,
    pub role_policy: RoutePolicy,
    pub request_timeout: Duration,
    pub database_url: Option<String>,
}

impl ApiConfig {
    /// Defaults for everything but the secret; used by tests and embedders.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3001,
            token_ttl: Duration::from_secs(86_400),
            role_policy: RoutePolicy::default(),
            request_timeout: Duration::from_secs(30),
            database_url: None,
        }
    }

    /// Load configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;
        let mut config = Self::new(jwt_secret);

        if let Some(host) = get("HOST") {
            config.host = parse("HOST", &host)?;
        }
        if let Some(port) = get("PORT") {
            config.port = parse("PORT", &port)?;
        }
        if let Some(ttl) = get("TOKEN_TTL_SECS") {
            let secs: u64 = parse("TOKEN_TTL_SECS", &ttl)?;
            if secs == 0 || secs > MAX_TOKEN_TTL_SECS {
                return Err(ConfigError::InvalidEnvVar(
                    "TOKEN_TTL_SECS".to_string(),
                    format!("must be between 1 and {MAX_TOKEN_TTL_SECS}"),
                ));
            }
            config.token_ttl = Duration::from_secs(secs);
        }
        if let Some(policy) = get("ROLE_POLICY") {
            config.role_policy = parse("ROLE_POLICY", &policy)?;
        }
        if let Some(timeout) = get("REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(parse("REQUEST_TIMEOUT_SECS", &timeout)?);
        }
        config.database_url = get("DATABASE_URL");

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
