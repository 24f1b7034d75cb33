//! Entity trait: identity + continuity across state changes.

use crate::EntityId;

/// Entity marker + minimal interface.
///
/// Every persisted record in the back office (users, products, orders,
/// suppliers, discounts) is keyed by a store-assigned [`EntityId`] and lives in
/// exactly one named collection.
pub trait Entity {
    /// Name of the collection this entity is stored in (e.g. `"products"`).
    const COLLECTION: &'static str;

    /// Serialized field names whose values must be unique across the
    /// collection (e.g. a user's `"email"`).
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    /// Returns the entity identifier.
    fn id(&self) -> EntityId;
}
