use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use canteen_core::{DomainError, DomainResult, Entity, EntityId, error::require_non_blank};
use canteen_products::Product;

/// Largest quantity accepted on a single order line.
pub const MAX_LINE_QUANTITY: i64 = 100_000;

/// Order status. Any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// A requested order item: which product and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: EntityId,
    pub quantity: i64,
}

/// Snapshot line item: product name and price as they were when the order was
/// placed. Later catalog edits never reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: EntityId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i64,
}

impl OrderLine {
    pub fn snapshot(product: &Product, quantity: i64) -> DomainResult<Self> {
        ensure_quantity(quantity)?;
        Ok(Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
        })
    }

    pub fn subtotal(&self) -> DomainResult<Decimal> {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(out_of_range)
    }
}

/// A placed order.
///
/// # Invariants
/// - at least one line, non-blank customer name
/// - `total == Σ line.price × line.quantity`
/// - only `status` changes after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: EntityId,
    pub customer_name: String,
    pub items: Vec<OrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
    pub cashier: String,
    pub timestamp: DateTime<Utc>,
}

impl Order {
    /// Validate the request shape before any product lookups happen.
    pub fn validate_request(customer_name: &str, items: &[OrderItemRequest]) -> DomainResult<()> {
        require_non_blank("customerName", customer_name)?;
        if items.is_empty() {
            return Err(DomainError::validation("order must contain at least one item"));
        }
        if let Some(bad) = items.iter().find(|i| i.quantity <= 0) {
            return Err(DomainError::validation(format!(
                "quantity for product {} must be positive",
                bad.product_id
            )));
        }
        if let Some(bad) = items.iter().find(|i| i.quantity > MAX_LINE_QUANTITY) {
            return Err(DomainError::validation(format!(
                "quantity for product {} cannot exceed {MAX_LINE_QUANTITY}",
                bad.product_id
            )));
        }
        Ok(())
    }

    /// Assemble an order from already-snapshotted lines.
    pub fn place(
        customer_name: &str,
        items: Vec<OrderLine>,
        cashier: &str,
        status: OrderStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        require_non_blank("customerName", customer_name)?;
        require_non_blank("cashier", cashier)?;
        if items.is_empty() {
            return Err(DomainError::validation("order must contain at least one item"));
        }

        let total = items.iter().try_fold(Decimal::ZERO, |acc, line| {
            acc.checked_add(line.subtotal()?).ok_or_else(out_of_range)
        })?;
        Ok(Self {
            id: EntityId::new(),
            customer_name: customer_name.trim().to_string(),
            items,
            total,
            status,
            cashier: cashier.to_string(),
            timestamp: now,
        })
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

fn ensure_quantity(quantity: i64) -> DomainResult<()> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(DomainError::validation(format!("quantity cannot exceed {MAX_LINE_QUANTITY}")));
    }
    Ok(())
}

fn out_of_range() -> DomainError {
    DomainError::validation("order total out of range")
}

impl Entity for Order {
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> EntityId {
        self.id
    }
}
