//! Store and service error types.

use thiserror::Error;

use canteen_core::DomainError;

/// Failure inside a storage backend.
///
/// These are never the caller's fault; the API reports them as internal errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A document could not be (de)serialized.
    #[error("document codec error in {collection}: {source}")]
    Codec {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The backend rejected or failed the operation.
    #[error("store backend error in {operation}: {message}")]
    Backend { operation: &'static str, message: String },

    /// Internal lock was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(&'static str),
}

impl StoreError {
    pub fn codec(collection: &'static str, source: serde_json::Error) -> Self {
        Self::Codec { collection, source }
    }

    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

/// Error returned by repositories and services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Credential hashing or token signing failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Domain error carried by this failure, if any.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
