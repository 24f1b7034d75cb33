//! Inventory adjuster: the single enforcement point for stock changes.

use std::sync::Arc;

use tracing::{info, warn};

use canteen_core::{DomainError, EntityId};
use canteen_inventory::adjust_stock;
use canteen_products::Product;

use crate::error::{ServiceError, ServiceResult};
use crate::repository::Repository;

pub struct InventoryAdjuster {
    products: Arc<dyn Repository<Product>>,
}

impl InventoryAdjuster {
    pub fn new(products: Arc<dyn Repository<Product>>) -> Self {
        Self { products }
    }

    /// Apply a signed stock delta (positive = inflow) and return the product.
    ///
    /// Fails with `NotFound` for unknown products and `InvariantViolation` if
    /// the stock would go negative; a failed adjustment changes nothing.
    pub async fn adjust(&self, product_id: EntityId, delta: i64) -> ServiceResult<Product> {
        let result = self
            .products
            .update_with(product_id, Box::new(move |p: &mut Product| adjust_stock(p, delta)))
            .await;

        match &result {
            Ok(product) => info!(product_id = %product_id, delta, stock = product.stock, "stock adjusted"),
            Err(ServiceError::Domain(DomainError::InvariantViolation(msg))) => {
                warn!(product_id = %product_id, delta, reason = %msg, "stock adjustment rejected")
            }
            Err(_) => {}
        }
        result
    }
}
