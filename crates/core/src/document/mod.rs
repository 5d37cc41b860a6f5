//! Fiscal document model.
//!
//! This module defines the document aggregate shared by sales and purchases:
//! - Document type tags and their numbering/reversal/stock tables
//! - Lifecycle statuses
//! - Line items and the monetary breakdown
//! - Totals computation with a single rounding point

pub mod totals;
pub mod types;

pub use totals::{compute_totals, DocumentTotals};
pub use types::{
    Document, DocumentCategory, DocumentStatus, DocumentType, LineItem, PaymentMethod,
    StockDirection,
};
