//! Generic document repository.
//!
//! Every back-office collection (users, products, orders, suppliers,
//! discounts) is stored through one [`Repository`] implementation per backend.
//! Documents are the entity types themselves, serialized with serde; unique
//! keys come from [`Entity::UNIQUE_FIELDS`].

mod in_memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use in_memory::InMemoryRepository;
#[cfg(feature = "postgres")]
pub use postgres::{PostgresRepository, migrate};

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use canteen_core::{DomainError, DomainResult, Entity, EntityId};

use crate::error::{ServiceResult, StoreError};

/// Anything that can be stored in a collection.
pub trait Document: Entity + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Document for T where T: Entity + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

/// In-place edit applied under the repository's write lock.
///
/// Returning an error aborts the update with no effect.
pub type Mutation<T> = Box<dyn FnOnce(&mut T) -> DomainResult<()> + Send>;

/// Equality filter on a single serialized field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: &'static str,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    fn matches(&self, doc: &Value) -> bool {
        doc.get(self.field) == Some(&self.value)
    }
}

#[async_trait::async_trait]
pub trait Repository<T: Document>: Send + Sync {
    /// Insert a new document. Fails with `Conflict` if a unique field is taken.
    async fn create(&self, doc: T) -> ServiceResult<T>;

    /// All documents in insertion order.
    async fn list(&self) -> ServiceResult<Vec<T>>;

    /// Fetch by id or fail with `NotFound`.
    async fn get(&self, id: EntityId) -> ServiceResult<T>;

    /// Replace an existing document wholesale.
    async fn update(&self, doc: T) -> ServiceResult<T>;

    /// Remove by id or fail with `NotFound`.
    async fn delete(&self, id: EntityId) -> ServiceResult<()>;

    /// Atomic read-modify-write of a single document.
    async fn update_with(&self, id: EntityId, mutation: Mutation<T>) -> ServiceResult<T>;

    async fn find_one(&self, filter: Filter) -> ServiceResult<Option<T>>;

    async fn count(&self) -> ServiceResult<usize>;
}

#[async_trait::async_trait]
impl<T, R> Repository<T> for Arc<R>
where
    T: Document,
    R: Repository<T> + ?Sized,
{
    async fn create(&self, doc: T) -> ServiceResult<T> {
        (**self).create(doc).await
    }

    async fn list(&self) -> ServiceResult<Vec<T>> {
        (**self).list().await
    }

    async fn get(&self, id: EntityId) -> ServiceResult<T> {
        (**self).get(id).await
    }

    async fn update(&self, doc: T) -> ServiceResult<T> {
        (**self).update(doc).await
    }

    async fn delete(&self, id: EntityId) -> ServiceResult<()> {
        (**self).delete(id).await
    }

    async fn update_with(&self, id: EntityId, mutation: Mutation<T>) -> ServiceResult<T> {
        (**self).update_with(id, mutation).await
    }

    async fn find_one(&self, filter: Filter) -> ServiceResult<Option<T>> {
        (**self).find_one(filter).await
    }

    async fn count(&self) -> ServiceResult<usize> {
        (**self).count().await
    }
}

pub(crate) fn encode<T: Document>(doc: &T) -> Result<Value, StoreError> {
    serde_json::to_value(doc).map_err(|e| StoreError::codec(T::COLLECTION, e))
}

pub(crate) fn decode<T: Document>(value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::codec(T::COLLECTION, e))
}

pub(crate) fn not_found<T: Document>(id: EntityId) -> DomainError {
    DomainError::not_found(format!("{} {id}", singular(T::COLLECTION)))
}

pub(crate) fn taken<T: Document>(field: &str) -> DomainError {
    DomainError::conflict(format!("{} with this {field} already exists", singular(T::COLLECTION)))
}

fn singular(collection: &str) -> &str {
    collection.strip_suffix('s').unwrap_or(collection)
}
