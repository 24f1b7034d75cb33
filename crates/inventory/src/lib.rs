//! Inventory domain module.
//!
//! Business rules for stock movements, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod stock;

pub use stock::{StockMovement, StockTransaction, adjust_stock, apply_delta, check_outflow};
