//! Engine-wide error taxonomy.
//!
//! Every mutating operation returns success-with-new-state or one of these
//! typed failures; nothing is silently swallowed. Messages name the violated
//! invariant with its concrete values so callers can surface them directly.

use rust_decimal::Decimal;
use thiserror::Error;

use gestra_shared::types::{CashRegisterId, DocumentId, PartyId, ProductId, SeriesId};

use crate::document::DocumentType;

/// Errors that can occur during fiscal engine operations.
#[derive(Debug, Error)]
pub enum FiscalError {
    // ========== Validation Errors ==========
    /// Malformed draft or request, rejected before any state change.
    #[error("Validation error: {0}")]
    Validation(String),

    // ========== Numbering Errors ==========
    /// Series is disabled and cannot allocate numbers.
    #[error("Series {0} is inactive")]
    SeriesInactive(SeriesId),

    /// Series year does not match the operation's fiscal year context.
    #[error("Series year {series_year} does not match fiscal year {fiscal_year}")]
    SeriesExpired {
        /// The year the series was opened for.
        series_year: i32,
        /// The fiscal year of the operation.
        fiscal_year: i32,
    },

    /// Auto-allocation requested on a manual series.
    #[error("Series {0} is manual and cannot auto-allocate numbers")]
    ManualSeriesAutoAllocation(SeriesId),

    /// A manual series requires an externally supplied number.
    #[error("Series {0} is manual: a document number must be supplied")]
    ManualNumberRequired(SeriesId),

    /// The supplied manual number was already used in this series.
    #[error("Number {number} was already used in series {series_id}")]
    DuplicateManualNumber {
        /// The series the collision occurred in.
        series_id: SeriesId,
        /// The colliding number.
        number: String,
    },

    // ========== Lifecycle Errors ==========
    /// Operation requires a certified document.
    #[error("Document {0} is not certified")]
    NotCertified(DocumentId),

    /// Document was already cancelled; CANCELLED is terminal.
    #[error("Document {0} is already cancelled")]
    AlreadyCancelled(DocumentId),

    /// Cancel requested on a type with no defined reversal document.
    #[error("Document type {0} has no defined reversal document")]
    IrreversibleType(DocumentType),

    /// Liquidation amount exceeds the outstanding balance.
    #[error("Amount {requested} exceeds outstanding balance of {outstanding}")]
    Overpayment {
        /// The requested payment amount.
        requested: Decimal,
        /// The document's outstanding balance.
        outstanding: Decimal,
    },

    // ========== Posting Errors ==========
    /// Cash register is closed and cannot receive payments.
    #[error("Cash register {0} is closed")]
    RegisterClosed(CashRegisterId),

    // ========== Not Found ==========
    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Series not found.
    #[error("Series not found: {0}")]
    SeriesNotFound(SeriesId),

    /// Party (client or supplier) not found.
    #[error("Party not found: {0}")]
    PartyNotFound(PartyId),

    /// Cash register not found.
    #[error("Cash register not found: {0}")]
    RegisterNotFound(CashRegisterId),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    // ========== Concurrency Errors ==========
    /// Lock conflict detected; the whole operation is safe to retry.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,
}

impl FiscalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::SeriesInactive(_) => "SERIES_INACTIVE",
            Self::SeriesExpired { .. } => "SERIES_EXPIRED",
            Self::ManualSeriesAutoAllocation(_) => "MANUAL_SERIES_AUTO_ALLOCATION",
            Self::ManualNumberRequired(_) => "MANUAL_NUMBER_REQUIRED",
            Self::DuplicateManualNumber { .. } => "DUPLICATE_MANUAL_NUMBER",
            Self::NotCertified(_) => "NOT_CERTIFIED",
            Self::AlreadyCancelled(_) => "ALREADY_CANCELLED",
            Self::IrreversibleType(_) => "IRREVERSIBLE_TYPE",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::RegisterClosed(_) => "REGISTER_CLOSED",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::SeriesNotFound(_) => "SERIES_NOT_FOUND",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::RegisterNotFound(_) => "REGISTER_NOT_FOUND",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation and business-rule errors
            Self::Validation(_)
            | Self::SeriesInactive(_)
            | Self::SeriesExpired { .. }
            | Self::ManualSeriesAutoAllocation(_)
            | Self::ManualNumberRequired(_)
            | Self::NotCertified(_)
            | Self::AlreadyCancelled(_)
            | Self::IrreversibleType(_)
            | Self::Overpayment { .. }
            | Self::RegisterClosed(_) => 400,

            // 404 Not Found
            Self::DocumentNotFound(_)
            | Self::SeriesNotFound(_)
            | Self::PartyNotFound(_)
            | Self::RegisterNotFound(_)
            | Self::ProductNotFound(_) => 404,

            // 409 Conflict
            Self::DuplicateManualNumber { .. } | Self::ConcurrentModification => 409,
        }
    }

    /// Returns true if retrying the whole operation from scratch is safe.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}
