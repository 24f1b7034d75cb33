use std::sync::RwLock;

use canteen_core::EntityId;

use super::{Document, Filter, Mutation, Repository, decode, encode, not_found, taken};
use crate::error::{ServiceResult, StoreError};

/// In-memory document collection for tests/dev.
///
/// Documents are kept in serialized form so filters and unique checks see the
/// same field names the Postgres backend does.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    docs: RwLock<Vec<(EntityId, serde_json::Value)>>,
    _doc: std::marker::PhantomData<fn() -> T>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            _doc: std::marker::PhantomData,
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// First unique field of `candidate` already used by another document.
fn unique_clash<T: Document>(
    docs: &[(EntityId, serde_json::Value)],
    id: EntityId,
    candidate: &serde_json::Value,
) -> Option<&'static str> {
    T::UNIQUE_FIELDS.iter().copied().find(|field| {
        let Some(value) = candidate.get(*field) else {
            return false;
        };
        docs.iter()
            .any(|(other, doc)| *other != id && doc.get(*field) == Some(value))
    })
}

#[async_trait::async_trait]
impl<T: Document> Repository<T> for InMemoryRepository<T> {
    async fn create(&self, doc: T) -> ServiceResult<T> {
        let value = encode(&doc)?;
        let mut docs = self.docs.write().map_err(|_| StoreError::Poisoned(T::COLLECTION))?;
        if let Some(field) = unique_clash::<T>(&docs, doc.id(), &value) {
            return Err(taken::<T>(field).into());
        }
        docs.push((doc.id(), value));
        Ok(doc)
    }

    async fn list(&self) -> ServiceResult<Vec<T>> {
        let docs = self.docs.read().map_err(|_| StoreError::Poisoned(T::COLLECTION))?;
        docs.iter()
            .map(|(_, value)| decode(value.clone()).map_err(Into::into))
            .collect()
    }

    async fn get(&self, id: EntityId) -> ServiceResult<T> {
        let docs = self.docs.read().map_err(|_| StoreError::Poisoned(T::COLLECTION))?;
        match docs.iter().find(|(k, _)| *k == id) {
            Some((_, value)) => Ok(decode(value.clone())?),
            None => Err(not_found::<T>(id).into()),
        }
    }

    async fn update(&self, doc: T) -> ServiceResult<T> {
        let id = doc.id();
        let value = encode(&doc)?;
        let mut docs = self.docs.write().map_err(|_| StoreError::Poisoned(T::COLLECTION))?;
        if let Some(field) = unique_clash::<T>(&docs, id, &value) {
            return Err(taken::<T>(field).into());
        }
        let slot = docs
            .iter_mut()
            .find(|(k, _)| *k == id)
            .ok_or_else(|| not_found::<T>(id))?;
        slot.1 = value;
        Ok(doc)
    }

    async fn delete(&self, id: EntityId) -> ServiceResult<()> {
        let mut docs = self.docs.write().map_err(|_| StoreError::Poisoned(T::COLLECTION))?;
        let before = docs.len();
        docs.retain(|(k, _)| *k != id);
        if docs.len() == before {
            return Err(not_found::<T>(id).into());
        }
        Ok(())
    }

    async fn update_with(&self, id: EntityId, mutation: Mutation<T>) -> ServiceResult<T> {
        let mut docs = self.docs.write().map_err(|_| StoreError::Poisoned(T::COLLECTION))?;
        let index = docs
            .iter()
            .position(|(k, _)| *k == id)
            .ok_or_else(|| not_found::<T>(id))?;

        let mut doc: T = decode(docs[index].1.clone())?;
        mutation(&mut doc)?;
        let value = encode(&doc)?;
        if let Some(field) = unique_clash::<T>(&docs, id, &value) {
            return Err(taken::<T>(field).into());
        }
        docs[index].1 = value;
        Ok(doc)
    }

    async fn find_one(&self, filter: Filter) -> ServiceResult<Option<T>> {
        let docs = self.docs.read().map_err(|_| StoreError::Poisoned(T::COLLECTION))?;
        match docs.iter().find(|(_, value)| filter.matches(value)) {
            Some((_, value)) => Ok(Some(decode(value.clone())?)),
            None => Ok(None),
        }
    }

    async fn count(&self) -> ServiceResult<usize> {
        let docs = self.docs.read().map_err(|_| StoreError::Poisoned(T::COLLECTION))?;
        Ok(docs.len())
    }
}
