//! Lifecycle orchestration over the entity store.
//!
//! Each mutating operation is one logical transaction: all entity locks are
//! acquired up front in the fixed global order (document → series → party →
//! cash register → products sorted by id), every posting target is
//! validated before the first mutation, and only then does the operation
//! allocate, stamp, sign and post. A failure before that point leaves no
//! partial numbering or ledger effect.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use tracing::info;

use gestra_shared::types::money::round_money;
use gestra_shared::types::{DocumentId, ProductId};

use crate::document::{Document, DocumentCategory, DocumentStatus, DocumentType, LineItem};
use crate::document::totals::compute_totals;
use crate::error::FiscalError;
use crate::ledger::LedgerPoster;
use crate::ledger::types::PartyKind;
use crate::series::{SequenceAllocator, SeriesKind};
use crate::signing::HashSigner;
use crate::store::{lock_entity, EngineStore};

use super::types::{
    Cancellation, DraftDocumentInput, DraftLineInput, LiquidateInput, Liquidation,
};

/// The document lifecycle orchestrator.
///
/// Exposes the public operations (Create, Certify, Liquidate, Cancel,
/// Derive) and owns documents from the moment a certifying operation is
/// invoked. Party ledgers, registers and stock are mutated exclusively
/// through the poster, inside this orchestrator's critical sections.
pub struct DocumentLifecycle {
    store: Arc<EngineStore>,
}

impl DocumentLifecycle {
    /// Creates a lifecycle over the given store.
    #[must_use]
    pub fn new(store: Arc<EngineStore>) -> Self {
        Self { store }
    }

    /// The underlying store, for read models and entity registration.
    #[must_use]
    pub fn store(&self) -> &EngineStore {
        &self.store
    }

    /// Stores a draft document. No numbering, no ledger effect.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed drafts; `SeriesNotFound` / `PartyNotFound`
    /// / `RegisterNotFound` when a referenced entity is missing.
    pub fn create(&self, input: DraftDocumentInput) -> Result<Document, FiscalError> {
        Self::validate_draft(&input)?;

        let series = self.store.series(input.series_id)?;
        if series.kind == SeriesKind::Normal && input.manual_number.is_some() {
            return Err(FiscalError::Validation(format!(
                "series {} auto-numbers documents: a manual number cannot be supplied",
                series.code
            )));
        }

        let party = self.store.party(input.party_id)?;
        let expected_kind = match input.category {
            DocumentCategory::Sale => PartyKind::Client,
            DocumentCategory::Purchase => PartyKind::Supplier,
        };
        if party.kind != expected_kind {
            return Err(FiscalError::Validation(format!(
                "party {} is not on the {:?} side",
                party.name, input.category
            )));
        }

        if let Some(payment) = &input.payment {
            if !input.doc_type.affects_ledger() {
                return Err(FiscalError::Validation(format!(
                    "document type {} cannot capture a payment",
                    input.doc_type
                )));
            }
            // Existence only; openness is re-checked at certification.
            self.store.register_handle(payment.cash_register_id)?;
        }

        let items: Vec<LineItem> = input
            .items
            .iter()
            .map(|line| LineItem {
                product_id: line.product_id,
                description: line.description.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                discount_pct: line.discount_pct,
                tax_rate: line.tax_rate,
            })
            .collect();
        let totals =
            compute_totals(&items, input.global_discount, input.withholding, input.retention);

        let now = Utc::now();
        let document = Document {
            id: DocumentId::new(),
            doc_type: input.doc_type,
            category: input.category,
            status: DocumentStatus::Draft,
            series_id: input.series_id,
            sequence: None,
            number: input.manual_number.clone(),
            issue_date: input.issue_date,
            party_id: input.party_id,
            party_name: party.name,
            items,
            subtotal: totals.subtotal,
            tax_total: totals.tax_total,
            global_discount: input.global_discount,
            withholding: input.withholding,
            retention: input.retention,
            total: totals.total,
            paid_amount: Decimal::ZERO,
            is_certified: false,
            fingerprint: None,
            source_document_id: None,
            cash_register_id: input.payment.as_ref().map(|p| p.cash_register_id),
            payment_method: input.payment.as_ref().map(|p| p.method),
            attachment: None,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        let snapshot = self.store.insert_document(document);
        info!(document_id = %snapshot.id, doc_type = %snapshot.doc_type, "draft document created");
        Ok(snapshot)
    }

    /// Certifies a document: stamps the legal number, the fingerprint, and
    /// posts the ledger effects, as one atomic unit.
    ///
    /// Re-certifying an already-certified document is a no-op returning the
    /// existing state, to tolerate duplicate UI calls.
    pub fn certify(&self, id: DocumentId) -> Result<Document, FiscalError> {
        let document_handle = self.store.document_handle(id)?;
        let mut document = lock_entity(&document_handle)?;

        if document.is_certified {
            info!(document_id = %id, "certify called on certified document, returning existing state");
            return Ok(document.clone());
        }
        if document.status == DocumentStatus::Cancelled {
            return Err(FiscalError::AlreadyCancelled(id));
        }

        // Gather and lock every entity the posting will touch, in the fixed
        // global order. Missing entities fail here, before any mutation.
        let series_handle = self.store.series_handle(document.series_id)?;
        let party_handle = self.store.party_handle(document.party_id)?;
        let register_handle = match document.cash_register_id {
            Some(register_id) => Some(self.store.register_handle(register_id)?),
            None => None,
        };
        let product_ids = Self::tracked_product_ids(&document);
        let product_handles = self.store.product_handles_sorted(&product_ids)?;

        let mut series = lock_entity(&series_handle)?;
        let mut party = lock_entity(&party_handle)?;
        let mut register = match register_handle.as_ref() {
            Some(handle) => Some(lock_entity(handle)?),
            None => None,
        };
        let mut product_guards = Vec::with_capacity(product_handles.len());
        for (_, handle) in &product_handles {
            product_guards.push(lock_entity(handle)?);
        }

        if let Some(register) = register.as_deref() {
            if document.has_payment_intent() && !register.is_open() {
                return Err(FiscalError::RegisterClosed(register.id));
            }
        }

        // Numbering. The allocator's failures all happen before it mutates
        // the series, and everything the poster touches has been validated
        // above, so from here the operation cannot half-apply.
        let fiscal_year = document.issue_date.year();
        let allocated = match series.kind {
            SeriesKind::Normal => {
                SequenceAllocator::allocate(&mut series, document.doc_type, fiscal_year)?
            }
            SeriesKind::Manual => {
                let number = document
                    .number
                    .clone()
                    .ok_or(FiscalError::ManualNumberRequired(series.id))?;
                SequenceAllocator::adopt_manual(
                    &mut series,
                    document.doc_type,
                    &number,
                    fiscal_year,
                )?
            }
        };

        document.sequence = Some(allocated.sequence);
        document.number = Some(allocated.formatted);
        document.is_certified = true;
        document.total = round_money(document.total);
        if document.has_payment_intent() {
            document.paid_amount = document.total;
            document.status = DocumentStatus::Paid;
        } else {
            document.status = DocumentStatus::Pending;
        }
        document.fingerprint = Some(HashSigner::sign(&document));
        document.updated_at = Utc::now();

        let mut product_refs: Vec<&mut _> =
            product_guards.iter_mut().map(|guard| &mut **guard).collect();
        let movements = LedgerPoster::post_certification(
            &document,
            &mut party,
            register.as_deref_mut(),
            &mut product_refs,
        )?;
        self.store.append_movements(movements)?;

        info!(
            document_id = %id,
            number = document.number.as_deref().unwrap_or_default(),
            total = %document.total,
            "document certified"
        );
        Ok(document.clone())
    }

    /// Records a payment against a certified document, issuing a certified
    /// receipt through the document's own series.
    pub fn liquidate(&self, input: LiquidateInput) -> Result<Liquidation, FiscalError> {
        let amount = round_money(input.amount);
        if amount <= Decimal::ZERO {
            return Err(FiscalError::Validation(
                "liquidation amount must be positive".to_string(),
            ));
        }

        let document_handle = self.store.document_handle(input.document_id)?;
        let mut document = lock_entity(&document_handle)?;

        if !document.is_certified {
            return Err(FiscalError::NotCertified(document.id));
        }
        if document.status == DocumentStatus::Cancelled {
            return Err(FiscalError::AlreadyCancelled(document.id));
        }
        let outstanding = document.outstanding();
        if amount > outstanding {
            return Err(FiscalError::Overpayment {
                requested: amount,
                outstanding,
            });
        }

        let series_handle = self.store.series_handle(document.series_id)?;
        let party_handle = self.store.party_handle(document.party_id)?;
        let register_handle = self.store.register_handle(input.cash_register_id)?;

        let mut series = lock_entity(&series_handle)?;
        let mut party = lock_entity(&party_handle)?;
        let mut register = lock_entity(&register_handle)?;

        if !register.is_open() {
            return Err(FiscalError::RegisterClosed(register.id));
        }

        // The receipt shares the original's fiscal-year context so the
        // series year check matches the document being settled.
        let fiscal_year = document.issue_date.year();
        let allocated =
            SequenceAllocator::allocate(&mut series, DocumentType::Rg, fiscal_year)?;

        let original_number = document.number.clone().unwrap_or_default();
        let now = Utc::now();
        let mut receipt = Document {
            id: DocumentId::new(),
            doc_type: DocumentType::Rg,
            category: document.category,
            status: DocumentStatus::Paid,
            series_id: document.series_id,
            sequence: Some(allocated.sequence),
            number: Some(allocated.formatted),
            issue_date: now.date_naive(),
            party_id: document.party_id,
            party_name: document.party_name.clone(),
            items: vec![LineItem {
                product_id: None,
                description: format!("Settlement of {original_number}"),
                quantity: Decimal::ONE,
                unit_price: amount,
                discount_pct: Decimal::ZERO,
                tax_rate: Decimal::ZERO,
            }],
            subtotal: amount,
            tax_total: Decimal::ZERO,
            global_discount: Decimal::ZERO,
            withholding: Decimal::ZERO,
            retention: Decimal::ZERO,
            total: amount,
            paid_amount: amount,
            is_certified: true,
            fingerprint: None,
            source_document_id: Some(document.id),
            cash_register_id: Some(input.cash_register_id),
            payment_method: Some(input.method),
            attachment: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        receipt.fingerprint = Some(HashSigner::sign(&receipt));

        LedgerPoster::post_liquidation(&document, &receipt, amount, &mut party, &mut register)?;

        document.paid_amount += amount;
        document.status = document.payment_status();
        document.updated_at = now;

        let receipt = self.store.insert_document(receipt);
        info!(
            document_id = %document.id,
            receipt_number = receipt.number.as_deref().unwrap_or_default(),
            amount = %amount,
            status = ?document.status,
            "payment recorded"
        );
        Ok(Liquidation {
            document: document.clone(),
            receipt,
        })
    }

    /// Cancels a certified document by issuing the reversal document that
    /// offsets its posting. The original is never mutated financially; the
    /// audit trail keeps both postings.
    pub fn cancel(&self, id: DocumentId, reason: &str) -> Result<Cancellation, FiscalError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(FiscalError::Validation(
                "cancellation reason must not be empty".to_string(),
            ));
        }

        let document_handle = self.store.document_handle(id)?;
        let mut document = lock_entity(&document_handle)?;

        if !document.is_certified {
            return Err(FiscalError::NotCertified(id));
        }
        if document.status == DocumentStatus::Cancelled {
            return Err(FiscalError::AlreadyCancelled(id));
        }
        let reversal_type = document
            .doc_type
            .reversal_type()
            .ok_or(FiscalError::IrreversibleType(document.doc_type))?;

        let series_handle = self.store.series_handle(document.series_id)?;
        let party_handle = self.store.party_handle(document.party_id)?;
        let product_ids = if reversal_type.moves_stock() {
            Self::tracked_product_ids(&document)
        } else {
            Vec::new()
        };
        let product_handles = self.store.product_handles_sorted(&product_ids)?;

        let mut series = lock_entity(&series_handle)?;
        let mut party = lock_entity(&party_handle)?;
        let mut product_guards = Vec::with_capacity(product_handles.len());
        for (_, handle) in &product_handles {
            product_guards.push(lock_entity(handle)?);
        }

        // The reversal is numbered through the *same series* as the
        // original, in the original's fiscal-year context.
        let fiscal_year = document.issue_date.year();
        let allocated = SequenceAllocator::allocate(&mut series, reversal_type, fiscal_year)?;

        let original_number = document.number.clone().unwrap_or_default();
        let now = Utc::now();
        let mut reversal = Document {
            id: DocumentId::new(),
            doc_type: reversal_type,
            category: document.category,
            status: DocumentStatus::Pending,
            series_id: document.series_id,
            sequence: Some(allocated.sequence),
            number: Some(allocated.formatted),
            issue_date: now.date_naive(),
            party_id: document.party_id,
            party_name: document.party_name.clone(),
            items: document.items.clone(),
            subtotal: document.subtotal,
            tax_total: document.tax_total,
            global_discount: document.global_discount,
            withholding: document.withholding,
            retention: document.retention,
            total: document.total,
            paid_amount: Decimal::ZERO,
            is_certified: true,
            fingerprint: None,
            source_document_id: Some(document.id),
            cash_register_id: None,
            payment_method: None,
            attachment: None,
            notes: Some(format!("Reversal of {original_number}: {reason}")),
            created_at: now,
            updated_at: now,
        };
        reversal.fingerprint = Some(HashSigner::sign(&reversal));

        let mut product_refs: Vec<&mut _> =
            product_guards.iter_mut().map(|guard| &mut **guard).collect();
        let movements =
            LedgerPoster::post_cancellation(&document, &reversal, &mut party, &mut product_refs)?;
        self.store.append_movements(movements)?;

        document.status = DocumentStatus::Cancelled;
        document.notes = match document.notes.take() {
            Some(notes) => Some(format!("{notes}; Cancelled: {reason}")),
            None => Some(format!("Cancelled: {reason}")),
        };
        document.updated_at = now;

        let reversal = self.store.insert_document(reversal);
        info!(
            document_id = %id,
            reversal_number = reversal.number.as_deref().unwrap_or_default(),
            "document cancelled"
        );
        Ok(Cancellation {
            document: document.clone(),
            reversal,
        })
    }

    /// Copies a document's lines and party into a new draft of the target
    /// type, referencing the source. No numbering, no ledger effect until
    /// the draft is itself certified.
    pub fn derive(
        &self,
        id: DocumentId,
        target_type: DocumentType,
    ) -> Result<Document, FiscalError> {
        let source = self.store.document(id)?;

        // Full-precision totals are recomputed from the lines so repeated
        // derivations never accumulate rounding drift.
        let totals = compute_totals(
            &source.items,
            source.global_discount,
            source.withholding,
            source.retention,
        );

        let now = Utc::now();
        let draft = Document {
            id: DocumentId::new(),
            doc_type: target_type,
            category: source.category,
            status: DocumentStatus::Draft,
            series_id: source.series_id,
            sequence: None,
            number: None,
            issue_date: now.date_naive(),
            party_id: source.party_id,
            party_name: source.party_name.clone(),
            items: source.items.clone(),
            subtotal: totals.subtotal,
            tax_total: totals.tax_total,
            global_discount: source.global_discount,
            withholding: source.withholding,
            retention: source.retention,
            total: totals.total,
            paid_amount: Decimal::ZERO,
            is_certified: false,
            fingerprint: None,
            source_document_id: Some(source.id),
            cash_register_id: None,
            payment_method: None,
            attachment: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let snapshot = self.store.insert_document(draft);
        info!(
            source_id = %id,
            document_id = %snapshot.id,
            target_type = %target_type,
            "document derived"
        );
        Ok(snapshot)
    }

    /// Sets a document's attachment reference (scan, PDF location).
    ///
    /// The attachment is one of the few fields that stays mutable after
    /// certification; the number, items and totals do not.
    pub fn attach(
        &self,
        id: DocumentId,
        reference: &str,
    ) -> Result<Document, FiscalError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(FiscalError::Validation(
                "attachment reference must not be empty".to_string(),
            ));
        }

        let document_handle = self.store.document_handle(id)?;
        let mut document = lock_entity(&document_handle)?;
        document.attachment = Some(reference.to_string());
        document.updated_at = Utc::now();

        info!(document_id = %id, "attachment recorded");
        Ok(document.clone())
    }

    fn tracked_product_ids(document: &Document) -> Vec<ProductId> {
        if !document.doc_type.moves_stock() {
            return Vec::new();
        }
        document
            .items
            .iter()
            .filter_map(|item| item.product_id)
            .collect()
    }

    fn validate_draft(input: &DraftDocumentInput) -> Result<(), FiscalError> {
        if input.items.is_empty() {
            return Err(FiscalError::Validation(
                "document must have at least one line item".to_string(),
            ));
        }
        for (index, line) in input.items.iter().enumerate() {
            Self::validate_line(index, line)?;
        }
        for (field, value) in [
            ("global discount", input.global_discount),
            ("withholding", input.withholding),
            ("retention", input.retention),
        ] {
            if value < Decimal::ZERO {
                return Err(FiscalError::Validation(format!(
                    "{field} must not be negative"
                )));
            }
        }
        Ok(())
    }

    fn validate_line(index: usize, line: &DraftLineInput) -> Result<(), FiscalError> {
        let line_number = index + 1;
        if line.quantity <= Decimal::ZERO {
            return Err(FiscalError::Validation(format!(
                "line {line_number}: quantity must be positive"
            )));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(FiscalError::Validation(format!(
                "line {line_number}: unit price must not be negative"
            )));
        }
        if line.discount_pct < Decimal::ZERO || line.discount_pct > Decimal::ONE_HUNDRED {
            return Err(FiscalError::Validation(format!(
                "line {line_number}: discount must be between 0 and 100"
            )));
        }
        if line.tax_rate < Decimal::ZERO {
            return Err(FiscalError::Validation(format!(
                "line {line_number}: tax rate must not be negative"
            )));
        }
        Ok(())
    }
}
