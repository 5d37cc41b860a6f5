//! Document totals computation.
//!
//! All aggregates are computed at full `Decimal` precision; rounding to
//! currency precision happens exactly once, at the point the total is
//! stamped during certification. This avoids cumulative drift across
//! repeated derivations.

use rust_decimal::Decimal;

use super::types::LineItem;

/// Monetary breakdown of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTotals {
    /// Sum of net line amounts.
    pub subtotal: Decimal,
    /// Sum of line tax amounts.
    pub tax_total: Decimal,
    /// `subtotal + tax_total - global_discount - withholding - retention`.
    pub total: Decimal,
}

/// Computes the monetary breakdown for a set of line items.
#[must_use]
pub fn compute_totals(
    items: &[LineItem],
    global_discount: Decimal,
    withholding: Decimal,
    retention: Decimal,
) -> DocumentTotals {
    let subtotal: Decimal = items.iter().map(LineItem::line_net).sum();
    let tax_total: Decimal = items.iter().map(LineItem::line_tax).sum();
    let total = subtotal + tax_total - global_discount - withholding - retention;

    DocumentTotals {
        subtotal,
        tax_total,
        total,
    }
}
