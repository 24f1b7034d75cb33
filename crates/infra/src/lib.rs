//! Infrastructure layer: document storage and the services built on it.
//!
//! Services hold `Arc<dyn Repository<T>>` handles so the API can run against
//! the in-memory store (tests/dev) or Postgres without code changes.

pub mod credentials;
pub mod error;
pub mod orders;
pub mod repository;
pub mod stock;

pub use credentials::{CredentialStore, LoginRequest, NewUser, Session, SignupRequest, UserPatch};
pub use error::{ServiceError, ServiceResult, StoreError};
pub use orders::{NewOrder, OrderProcessor};
pub use repository::{Document, Filter, InMemoryRepository, Mutation, Repository};
pub use stock::InventoryAdjuster;
