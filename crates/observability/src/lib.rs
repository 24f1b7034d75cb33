//! Tracing/logging setup shared by the server binary and tests.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, init, init_with};
