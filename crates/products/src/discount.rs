//! Discount codes.
//!
//! Discounts are managed like any other catalog record but are not applied to
//! order totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use canteen_core::{DomainError, DomainResult, Entity, EntityId, error::require_non_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: EntityId,
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountDraft {
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPatch {
    pub code: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<DiscountKind>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub value: Option<Decimal>,
    pub is_active: Option<bool>,
}

fn default_active() -> bool {
    true
}

impl Discount {
    pub fn create(draft: DiscountDraft) -> DomainResult<Self> {
        require_non_blank("code", &draft.code)?;
        ensure_value(draft.kind, draft.value)?;
        Ok(Self {
            id: EntityId::new(),
            code: draft.code.trim().to_string(),
            description: draft.description,
            kind: draft.kind,
            value: draft.value,
            is_active: draft.is_active,
        })
    }

    pub fn apply_patch(&mut self, patch: DiscountPatch) -> DomainResult<()> {
        if let Some(code) = &patch.code {
            require_non_blank("code", code)?;
        }
        ensure_value(patch.kind.unwrap_or(self.kind), patch.value.unwrap_or(self.value))?;

        if let Some(code) = patch.code {
            self.code = code.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        Ok(())
    }
}

impl Entity for Discount {
    const COLLECTION: &'static str = "discounts";
    const UNIQUE_FIELDS: &'static [&'static str] = &["code"];

    fn id(&self) -> EntityId {
        self.id
    }
}

fn ensure_value(kind: DiscountKind, value: Decimal) -> DomainResult<()> {
    if value < Decimal::ZERO {
        return Err(DomainError::validation("discount value cannot be negative"));
    }
    if kind == DiscountKind::Percentage && value > Decimal::ONE_HUNDRED {
        return Err(DomainError::validation("percentage discount cannot exceed 100"));
    }
    Ok(())
}
