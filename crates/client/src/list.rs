//! List screens: fetch, show, delete, and re-fetch on a failed mutation.

use async_trait::async_trait;
use tracing::warn;

use canteen_auth::UserProfile;
use canteen_core::{Entity, EntityId};
use canteen_parties::Supplier;
use canteen_products::{Discount, Product};
use canteen_sales::Order;

use crate::{ApiClient, ClientError};

/// What a list screen is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Loading,
    Ready(Vec<T>),
    Error(String),
}

/// Rows that can be removed by id.
pub trait Listed {
    fn key(&self) -> EntityId;
}

impl Listed for Product {
    fn key(&self) -> EntityId {
        self.id()
    }
}

impl Listed for Order {
    fn key(&self) -> EntityId {
        self.id()
    }
}

impl Listed for Supplier {
    fn key(&self) -> EntityId {
        self.id()
    }
}

impl Listed for Discount {
    fn key(&self) -> EntityId {
        self.id()
    }
}

impl Listed for UserProfile {
    fn key(&self) -> EntityId {
        self.id
    }
}

/// Backend of a list screen.
#[async_trait]
pub trait ListSource<T>: Send + Sync {
    async fn fetch(&self) -> Result<Vec<T>, ClientError>;
    async fn remove(&self, id: EntityId) -> Result<(), ClientError>;
}

macro_rules! api_source {
    ($ty:ty, $list:ident, $delete:ident) => {
        #[async_trait]
        impl ListSource<$ty> for ApiClient {
            async fn fetch(&self) -> Result<Vec<$ty>, ClientError> {
                self.$list().await
            }

            async fn remove(&self, id: EntityId) -> Result<(), ClientError> {
                self.$delete(id).await
            }
        }
    };
}

api_source!(Product, products, delete_product);
api_source!(Order, orders, delete_order);
api_source!(Supplier, suppliers, delete_supplier);
api_source!(Discount, discounts, delete_discount);
api_source!(UserProfile, users, delete_user);

#[derive(Debug)]
pub struct ListView<T> {
    state: ListState<T>,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self { state: ListState::Loading }
    }
}

impl<T: Listed + Send> ListView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ListState<T> {
        &self.state
    }

    /// Rows currently shown; empty while loading or after an error.
    pub fn items(&self) -> &[T] {
        match &self.state {
            ListState::Ready(items) => items,
            _ => &[],
        }
    }

    pub async fn refresh<S>(&mut self, source: &S)
    where
        S: ListSource<T> + ?Sized,
    {
        self.state = ListState::Loading;
        self.state = match source.fetch().await {
            Ok(items) => ListState::Ready(items),
            Err(err) => ListState::Error(err.to_string()),
        };
    }

    /// Delete a row on the server.
    ///
    /// On success the row is dropped locally. On failure the list is re-fetched
    /// and the error returned for display.
    pub async fn delete<S>(&mut self, source: &S, id: EntityId) -> Result<(), ClientError>
    where
        S: ListSource<T> + ?Sized,
    {
        match source.remove(id).await {
            Ok(()) => {
                if let ListState::Ready(items) = &mut self.state {
                    items.retain(|item| item.key() != id);
                }
                Ok(())
            }
            Err(err) => {
                warn!(%id, error = %err, "delete failed; refetching");
                self.refresh(source).await;
                Err(err)
            }
        }
    }

    /// Show a row returned by a create or update.
    pub fn upsert(&mut self, item: T) {
        if let ListState::Ready(items) = &mut self.state {
            match items.iter_mut().find(|existing| existing.key() == item.key()) {
                Some(existing) => *existing = item,
                None => items.push(item),
            }
        }
    }
}
