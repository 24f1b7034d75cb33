//! Inventory screen: record a stock movement against a product.

use tracing::info;

use canteen_inventory::{StockMovement, StockTransaction, check_outflow};
use canteen_products::Product;

use crate::{ApiClient, ClientError};

/// Turn a movement into a signed delta, pre-checking outflows against the
/// stock shown on screen.
pub fn movement_delta(product: &Product, txn: &StockTransaction) -> Result<i64, ClientError> {
    let delta = txn.delta()?;
    if txn.movement == StockMovement::Outflow {
        check_outflow(product.stock, txn.quantity)?;
    }
    Ok(delta)
}

impl ApiClient {
    /// Record a stock movement. The server re-checks the result.
    pub async fn record_movement(&self, product: &Product, txn: &StockTransaction) -> Result<Product, ClientError> {
        let delta = movement_delta(product, txn)?;
        let updated = self.update_product_stock(txn.product_id, delta).await?;
        info!(product_id = %txn.product_id, delta, stock = updated.stock, "stock movement recorded");
        Ok(updated)
    }
}
