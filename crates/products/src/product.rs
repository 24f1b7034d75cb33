use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use canteen_core::{DomainError, DomainResult, Entity, EntityId, error::require_non_blank};

/// Stock at or below this level is reported as low.
pub const LOW_STOCK_THRESHOLD: i64 = 20;

/// Highest accepted unit price.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// A sellable catalog item.
///
/// # Invariants
/// - `0 <= price <= MAX_PRICE`
/// - `stock >= 0`; anything that would drive it below zero fails without
///   partial effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i64,
    #[serde(default)]
    pub allergens: BTreeSet<String>,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

/// Fields supplied when creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i64,
    #[serde(default)]
    pub allergens: BTreeSet<String>,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

/// Partial update of a product; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub allergens: Option<BTreeSet<String>>,
    pub supplier: Option<String>,
    /// `Some(None)` (an explicit `null`) clears the date.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<Option<NaiveDate>>,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Inventory status shown next to each product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    Expired,
    LowStock,
    InStock,
}

impl Product {
    pub fn create(draft: ProductDraft) -> DomainResult<Self> {
        require_non_blank("name", &draft.name)?;
        require_non_blank("category", &draft.category)?;
        ensure_price(draft.price)?;
        ensure_stock(draft.stock)?;

        Ok(Self {
            id: EntityId::new(),
            name: draft.name.trim().to_string(),
            category: draft.category.trim().to_string(),
            price: draft.price,
            stock: draft.stock,
            allergens: clean_allergens(draft.allergens),
            supplier: draft.supplier.trim().to_string(),
            expiry_date: draft.expiry_date,
        })
    }

    /// Apply a partial update. Validation happens before any field changes.
    pub fn apply_patch(&mut self, patch: ProductPatch) -> DomainResult<()> {
        if let Some(name) = &patch.name {
            require_non_blank("name", name)?;
        }
        if let Some(category) = &patch.category {
            require_non_blank("category", category)?;
        }
        if let Some(price) = patch.price {
            ensure_price(price)?;
        }
        if let Some(stock) = patch.stock {
            ensure_stock(stock)?;
        }

        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(category) = patch.category {
            self.category = category.trim().to_string();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(allergens) = patch.allergens {
            self.allergens = clean_allergens(allergens);
        }
        if let Some(supplier) = patch.supplier {
            self.supplier = supplier.trim().to_string();
        }
        if let Some(expiry_date) = patch.expiry_date {
            self.expiry_date = expiry_date;
        }
        Ok(())
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|d| d < today)
    }

    pub fn stock_status(&self, today: NaiveDate) -> StockStatus {
        if self.is_expired(today) {
            StockStatus::Expired
        } else if self.stock <= LOW_STOCK_THRESHOLD {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

impl Entity for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> EntityId {
        self.id
    }
}

fn ensure_price(price: Decimal) -> DomainResult<()> {
    if price < Decimal::ZERO {
        return Err(DomainError::validation("price cannot be negative"));
    }
    if price > MAX_PRICE {
        return Err(DomainError::validation(format!("price cannot exceed {MAX_PRICE}")));
    }
    Ok(())
}

fn ensure_stock(stock: i64) -> DomainResult<()> {
    if stock < 0 {
        return Err(DomainError::validation("stock cannot be negative"));
    }
    Ok(())
}

fn clean_allergens(allergens: BTreeSet<String>) -> BTreeSet<String> {
    allergens
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}
