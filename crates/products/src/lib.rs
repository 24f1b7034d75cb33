//! Catalog domain module: products and discounts.
//!
//! Pure domain logic (no IO, no HTTP, no storage).

pub mod discount;
pub mod product;

pub use discount::{Discount, DiscountDraft, DiscountKind, DiscountPatch};
pub use product::{LOW_STOCK_THRESHOLD, MAX_PRICE, Product, ProductDraft, ProductPatch, StockStatus};
