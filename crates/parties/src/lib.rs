//! Parties domain module (suppliers).
//!
//! Suppliers are plain reference records; products name their supplier as free
//! text, so nothing here links the two.

pub mod supplier;

pub use supplier::{Supplier, SupplierDraft, SupplierPatch};
