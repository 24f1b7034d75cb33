use thiserror::Error;

use canteen_core::DomainError;

/// Error surfaced to the operator as a blocking alert.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (server unreachable, bad response body).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error envelope.
    #[error("{message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// No token is held; the operator must log in first.
    #[error("not logged in")]
    NotLoggedIn,

    /// Rejected locally before any request was made.
    #[error(transparent)]
    Rejected(#[from] DomainError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable error code from the server envelope, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}
