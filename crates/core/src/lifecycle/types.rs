//! Input and outcome types for lifecycle operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gestra_shared::types::{CashRegisterId, DocumentId, PartyId, ProductId, SeriesId};

use crate::document::{Document, DocumentCategory, DocumentType, PaymentMethod};

/// One line of a draft document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLineInput {
    /// Inventory product this line draws from, if stock-tracked.
    pub product_id: Option<ProductId>,
    /// Line description.
    pub description: String,
    /// Quantity (must be positive).
    pub quantity: Decimal,
    /// Unit price before discount and tax.
    pub unit_price: Decimal,
    /// Line discount percentage (0-100).
    #[serde(default)]
    pub discount_pct: Decimal,
    /// Tax rate percentage (>= 0).
    #[serde(default)]
    pub tax_rate: Decimal,
}

/// Payment captured at issuance: the draft declares full payment intent
/// and certification settles the document immediately.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// How the payment was made.
    pub method: PaymentMethod,
    /// The register the payment goes into.
    pub cash_register_id: CashRegisterId,
}

/// A draft document submitted by a UI collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftDocumentInput {
    /// Document type tag.
    pub doc_type: DocumentType,
    /// Sale or purchase side.
    pub category: DocumentCategory,
    /// The numbering series to certify through.
    pub series_id: SeriesId,
    /// The client or supplier.
    pub party_id: PartyId,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Line items (at least one).
    pub items: Vec<DraftLineInput>,
    /// Document-level discount.
    #[serde(default)]
    pub global_discount: Decimal,
    /// Withholding tax.
    #[serde(default)]
    pub withholding: Decimal,
    /// Retention amount.
    #[serde(default)]
    pub retention: Decimal,
    /// Externally supplied number, required for manual series.
    #[serde(default)]
    pub manual_number: Option<String>,
    /// Full payment intent at issuance, if any.
    #[serde(default)]
    pub payment: Option<PaymentIntent>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A liquidation request against an outstanding document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidateInput {
    /// The document being settled.
    pub document_id: DocumentId,
    /// Payment amount (positive, at most the outstanding balance).
    pub amount: Decimal,
    /// How the payment was made.
    pub method: PaymentMethod,
    /// The register the payment goes into.
    pub cash_register_id: CashRegisterId,
}

/// Outcome of a liquidation: the updated document and the receipt issued
/// for the payment.
#[derive(Debug, Clone, Serialize)]
pub struct Liquidation {
    /// The settled (or partially settled) document.
    pub document: Document,
    /// The certified receipt referencing it.
    pub receipt: Document,
}

/// Outcome of a cancellation: the cancelled document and the reversal
/// document that offsets its posting.
#[derive(Debug, Clone, Serialize)]
pub struct Cancellation {
    /// The cancelled document.
    pub document: Document,
    /// The certified reversal (credit or debit note).
    pub reversal: Document,
}
