//! Document domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gestra_shared::types::{
    CashRegisterId, DocumentId, PartyId, ProductId, SeriesId,
};

/// Fiscal document type tag.
///
/// Sales and purchases share the same tag set; the [`DocumentCategory`]
/// on the document distinguishes the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    /// Invoice.
    Ft,
    /// Invoice-receipt (paid at issuance).
    Fr,
    /// Cash sale.
    Vd,
    /// Simplified invoice.
    Fs,
    /// Credit note.
    Nc,
    /// Debit note.
    Nd,
    /// Receipt.
    Rg,
    /// Pro forma invoice.
    Pp,
    /// Quotation.
    Or,
    /// Delivery note.
    Gr,
    /// Transport guide.
    Gt,
    /// Dispatch guide.
    Ge,
    /// Purchase order.
    Ne,
}

impl DocumentType {
    /// The prefix stamped on formatted numbers (e.g. `FT A2025/1`).
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Ft => "FT",
            Self::Fr => "FR",
            Self::Vd => "VD",
            Self::Fs => "FS",
            Self::Nc => "NC",
            Self::Nd => "ND",
            Self::Rg => "RG",
            Self::Pp => "PP",
            Self::Or => "OR",
            Self::Gr => "GR",
            Self::Gt => "GT",
            Self::Ge => "GE",
            Self::Ne => "NE",
        }
    }

    /// Human label used in ledger transaction descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ft => "Invoice",
            Self::Fr => "Invoice-receipt",
            Self::Vd => "Cash sale",
            Self::Fs => "Simplified invoice",
            Self::Nc => "Credit note",
            Self::Nd => "Debit note",
            Self::Rg => "Receipt",
            Self::Pp => "Pro forma invoice",
            Self::Or => "Quotation",
            Self::Gr => "Delivery note",
            Self::Gt => "Transport guide",
            Self::Ge => "Dispatch guide",
            Self::Ne => "Purchase order",
        }
    }

    /// The document type that reverses this one, if any.
    ///
    /// Invoice-like types are reversed by a credit note; a credit note is
    /// reversed by a debit note. Everything else has no defined reversal
    /// and cancelling it fails with `IrreversibleType`.
    #[must_use]
    pub const fn reversal_type(self) -> Option<Self> {
        match self {
            Self::Ft | Self::Fr | Self::Vd | Self::Fs | Self::Nd => Some(Self::Nc),
            Self::Nc => Some(Self::Nd),
            Self::Rg
            | Self::Pp
            | Self::Or
            | Self::Gr
            | Self::Gt
            | Self::Ge
            | Self::Ne => None,
        }
    }

    /// True for types that post on the credit side of their category's
    /// normal direction (credit notes and receipts).
    #[must_use]
    pub const fn is_credit_side(self) -> bool {
        matches!(self, Self::Nc | Self::Rg)
    }

    /// True for types whose certification posts a party-ledger transaction.
    ///
    /// Pro formas, quotations, orders and transport guides are numbered and
    /// certified but carry no financial effect.
    #[must_use]
    pub const fn affects_ledger(self) -> bool {
        matches!(
            self,
            Self::Ft | Self::Fr | Self::Vd | Self::Fs | Self::Nc | Self::Nd | Self::Rg
        )
    }

    /// True for types whose certification moves stock.
    #[must_use]
    pub const fn moves_stock(self) -> bool {
        matches!(self, Self::Ft | Self::Fr | Self::Vd | Self::Fs | Self::Nc)
    }

    /// Stock movement direction for this type on the given side, if any.
    ///
    /// Sales ship goods out (credit notes bring them back); purchases
    /// mirror that.
    #[must_use]
    pub const fn stock_direction(self, category: DocumentCategory) -> Option<StockDirection> {
        if !self.moves_stock() {
            return None;
        }
        let outgoing = !matches!(self, Self::Nc);
        Some(match (category, outgoing) {
            (DocumentCategory::Sale, true) | (DocumentCategory::Purchase, false) => {
                StockDirection::Exit
            }
            (DocumentCategory::Sale, false) | (DocumentCategory::Purchase, true) => {
                StockDirection::Entry
            }
        })
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Which side of the business a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    /// Client-facing document.
    Sale,
    /// Supplier-facing document.
    Purchase,
}

/// Document lifecycle status.
///
/// `DRAFT → {PENDING, PARTIAL, PAID} → CANCELLED`; CANCELLED is terminal.
/// Payment-progress transitions between PENDING/PARTIAL/PAID never change
/// the certification flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Being drafted; not yet owned by the lifecycle.
    Draft,
    /// Certified, nothing paid yet.
    Pending,
    /// Certified, partially paid.
    Partial,
    /// Certified and fully settled.
    Paid,
    /// Cancelled; terminal.
    Cancelled,
}

impl DocumentStatus {
    /// Returns true if no further transitions are allowed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true if the document can still receive payments.
    #[must_use]
    pub fn can_receive_payment(&self) -> bool {
        matches!(self, Self::Pending | Self::Partial)
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockDirection {
    /// Goods entering the warehouse.
    Entry,
    /// Goods leaving the warehouse.
    Exit,
}

/// Payment method captured at issuance or liquidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Card terminal.
    Card,
    /// Bank transfer.
    BankTransfer,
    /// Check.
    Check,
}

/// A single document line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Inventory product this line draws from, if stock-tracked.
    pub product_id: Option<ProductId>,
    /// Line description.
    pub description: String,
    /// Quantity (must be positive).
    pub quantity: Decimal,
    /// Unit price before discount and tax.
    pub unit_price: Decimal,
    /// Line discount percentage (0-100).
    pub discount_pct: Decimal,
    /// Tax rate percentage (>= 0).
    pub tax_rate: Decimal,
}

impl LineItem {
    /// Net line amount: `qty * unit_price * (1 - discount/100)`.
    ///
    /// Kept at full precision; rounding happens once, at total stamping.
    #[must_use]
    pub fn line_net(&self) -> Decimal {
        self.quantity * self.unit_price * (Decimal::ONE - self.discount_pct / Decimal::ONE_HUNDRED)
    }

    /// Line tax amount: `line_net * tax_rate / 100`.
    #[must_use]
    pub fn line_tax(&self) -> Decimal {
        self.line_net() * self.tax_rate / Decimal::ONE_HUNDRED
    }
}

/// A fiscal document (sale or purchase).
///
/// Once `is_certified` is true the number, type, items and totals are
/// immutable; only status, attachment and payment-progress fields change
/// afterwards, and only through the lifecycle operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier.
    pub id: DocumentId,
    /// Document type tag.
    pub doc_type: DocumentType,
    /// Sale or purchase side.
    pub category: DocumentCategory,
    /// Lifecycle status.
    pub status: DocumentStatus,
    /// The numbering series this document belongs to.
    pub series_id: SeriesId,
    /// Allocated sequence number, once certified.
    pub sequence: Option<u64>,
    /// Formatted legal number (e.g. `FT A2025/1`), once certified.
    pub number: Option<String>,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// The client or supplier.
    pub party_id: PartyId,
    /// Cached party name at issuance.
    pub party_name: String,
    /// Ordered line items.
    pub items: Vec<LineItem>,
    /// Sum of net line amounts.
    pub subtotal: Decimal,
    /// Sum of line tax amounts.
    pub tax_total: Decimal,
    /// Document-level discount.
    pub global_discount: Decimal,
    /// Withholding tax.
    pub withholding: Decimal,
    /// Retention amount.
    pub retention: Decimal,
    /// Document total (rounded at certification).
    pub total: Decimal,
    /// Amount settled so far.
    pub paid_amount: Decimal,
    /// Whether the document has been certified.
    pub is_certified: bool,
    /// Certification fingerprint, once certified.
    pub fingerprint: Option<String>,
    /// The document this one was derived from, if any.
    pub source_document_id: Option<DocumentId>,
    /// Register a payment at issuance was captured on.
    pub cash_register_id: Option<CashRegisterId>,
    /// Payment method captured at issuance.
    pub payment_method: Option<PaymentMethod>,
    /// Attachment reference (storage is external).
    pub attachment: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Outstanding balance: `total - paid_amount`.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        self.total - self.paid_amount
    }

    /// True if the draft carried a full payment intent at issuance.
    #[must_use]
    pub fn has_payment_intent(&self) -> bool {
        self.payment_method.is_some() && self.cash_register_id.is_some()
    }

    /// Recomputes the payment-progress status from `paid_amount`.
    ///
    /// Only meaningful for certified, non-cancelled documents.
    #[must_use]
    pub fn payment_status(&self) -> DocumentStatus {
        if self.paid_amount >= self.total {
            DocumentStatus::Paid
        } else if self.paid_amount > Decimal::ZERO {
            DocumentStatus::Partial
        } else {
            DocumentStatus::Pending
        }
    }
}
