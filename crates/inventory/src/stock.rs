use serde::{Deserialize, Serialize};

use canteen_core::{DomainError, DomainResult, EntityId};
use canteen_products::Product;

/// Direction of a recorded stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockMovement {
    /// Restock.
    Inflow,
    /// Sale, wastage or correction.
    Outflow,
}

/// A stock movement as entered on the inventory screen: a direction and a
/// positive quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockTransaction {
    pub product_id: EntityId,
    #[serde(rename = "type")]
    pub movement: StockMovement,
    pub quantity: i64,
}

impl StockTransaction {
    /// Signed delta for this movement (positive = inflow).
    pub fn delta(&self) -> DomainResult<i64> {
        if self.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(match self.movement {
            StockMovement::Inflow => self.quantity,
            StockMovement::Outflow => -self.quantity,
        })
    }
}

/// Compute `stock + delta`, failing if the result would be negative.
pub fn apply_delta(stock: i64, delta: i64) -> DomainResult<i64> {
    let new_stock = stock
        .checked_add(delta)
        .ok_or_else(|| DomainError::validation("stock change out of range"))?;
    if new_stock < 0 {
        return Err(DomainError::invariant(format!(
            "stock cannot go negative (current: {stock}, change: {delta})"
        )));
    }
    Ok(new_stock)
}

/// Apply a signed stock delta to a product.
///
/// On error the product is left unchanged.
pub fn adjust_stock(product: &mut Product, delta: i64) -> DomainResult<()> {
    product.stock = apply_delta(product.stock, delta)?;
    Ok(())
}

/// Pre-check an outflow against the stock the caller last saw.
///
/// Only used for friendlier messages; [`adjust_stock`] remains the enforcement
/// point.
pub fn check_outflow(available: i64, quantity: i64) -> DomainResult<()> {
    if quantity > available {
        return Err(DomainError::invariant("Cannot record outflow. Not enough stock."));
    }
    Ok(())
}
