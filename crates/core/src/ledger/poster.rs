//! Ledger posting for certified state transitions.
//!
//! Postings are all-or-nothing per document: every target is validated
//! before the first mutation, so a failure partway can never leave stock
//! decremented without the matching ledger entry. The caller (the
//! lifecycle) holds all entity locks for the duration of a call.

use rust_decimal::Decimal;

use crate::document::{Document, DocumentCategory, StockDirection};
use crate::error::FiscalError;

use gestra_shared::types::StockMovementId;

use super::types::{
    CashRegister, LedgerTransaction, PartyLedger, Product, StockMovement, TransactionDirection,
};

/// Applies the financial side effects of document state transitions.
pub struct LedgerPoster;

impl LedgerPoster {
    /// Posts the effects of a freshly certified document: the party-ledger
    /// transaction, stock movements for inventory-tracked lines, and the
    /// cash-register movement when a payment was captured at issuance.
    ///
    /// Returns the stock movements to append to the log. Types with no
    /// ledger effect (pro formas, quotations, guides) return empty.
    ///
    /// # Errors
    ///
    /// `ProductNotFound` if a stock-tracked line references a product not
    /// present in `products`; nothing is mutated in that case.
    pub fn post_certification(
        document: &Document,
        party: &mut PartyLedger,
        register: Option<&mut CashRegister>,
        products: &mut [&mut Product],
    ) -> Result<Vec<StockMovement>, FiscalError> {
        let number = document.number.clone().unwrap_or_default();
        let description = format!("{} {}", document.doc_type.label(), number);
        Self::post_document(document, description, party, register, products)
    }

    /// Posts a liquidation: the settlement transaction on the party ledger
    /// and the cash-register movement, both for `amount`.
    ///
    /// The receipt document has already been certified; `original` names
    /// the settled document in the transaction description.
    ///
    /// # Errors
    ///
    /// `RegisterClosed` if the register cannot receive the payment;
    /// nothing is mutated in that case.
    pub fn post_liquidation(
        original: &Document,
        receipt: &Document,
        amount: Decimal,
        party: &mut PartyLedger,
        register: &mut CashRegister,
    ) -> Result<(), FiscalError> {
        if !register.is_open() {
            return Err(FiscalError::RegisterClosed(register.id));
        }

        let receipt_number = receipt.number.clone().unwrap_or_default();
        let original_number = original.number.clone().unwrap_or_default();
        let direction = settlement_direction(original.category);

        party.apply(LedgerTransaction {
            date: receipt.issue_date,
            direction,
            description: format!(
                "{} {} settling {}",
                receipt.doc_type.label(),
                receipt_number,
                original_number
            ),
            document_number: receipt_number,
            amount,
            doc_type: receipt.doc_type,
        });

        register.balance += cash_sign(original.category) * amount;
        Ok(())
    }

    /// Posts the inverse ledger entry of a cancellation through its
    /// reversal document. The original document's postings stay in the
    /// history untouched; the audit trail shows both.
    ///
    /// # Errors
    ///
    /// `ProductNotFound` as for [`Self::post_certification`].
    pub fn post_cancellation(
        original: &Document,
        reversal: &Document,
        party: &mut PartyLedger,
        products: &mut [&mut Product],
    ) -> Result<Vec<StockMovement>, FiscalError> {
        let reversal_number = reversal.number.clone().unwrap_or_default();
        let original_number = original.number.clone().unwrap_or_default();
        let description = format!(
            "{} {} reversing {}",
            reversal.doc_type.label(),
            reversal_number,
            original_number
        );
        Self::post_document(reversal, description, party, None, products)
    }

    fn post_document(
        document: &Document,
        description: String,
        party: &mut PartyLedger,
        register: Option<&mut CashRegister>,
        products: &mut [&mut Product],
    ) -> Result<Vec<StockMovement>, FiscalError> {
        let number = document.number.clone().unwrap_or_default();

        // Validate phase: resolve every stock-tracked line before touching
        // anything, so the apply phase cannot fail.
        let mut stock_plan: Vec<(usize, Decimal)> = Vec::new();
        if let Some(direction) = document.doc_type.stock_direction(document.category) {
            for item in &document.items {
                let Some(product_id) = item.product_id else {
                    continue;
                };
                let index = products
                    .iter()
                    .position(|p| p.id == product_id)
                    .ok_or(FiscalError::ProductNotFound(product_id))?;
                let signed = match direction {
                    StockDirection::Entry => item.quantity,
                    StockDirection::Exit => -item.quantity,
                };
                stock_plan.push((index, signed));
            }
        }

        // Apply phase: infallible from here on.
        let mut movements = Vec::with_capacity(stock_plan.len());
        if let Some(direction) = document.doc_type.stock_direction(document.category) {
            for (index, signed) in stock_plan {
                let product = &mut products[index];
                product.stock += signed;
                movements.push(StockMovement {
                    id: StockMovementId::new(),
                    direction,
                    product_id: product.id,
                    quantity: signed.abs(),
                    warehouse_id: product.warehouse_id,
                    document_number: number.clone(),
                });
            }
        }

        if document.doc_type.affects_ledger() {
            let direction = party_direction(document.category, document.doc_type);
            party.apply(LedgerTransaction {
                date: document.issue_date,
                direction,
                description,
                document_number: number.clone(),
                amount: document.total,
                doc_type: document.doc_type,
            });

            // Payment captured at issuance: move the register and append the
            // settlement entry so the party balance nets out immediately.
            if document.has_payment_intent() {
                if let Some(register) = register {
                    register.balance += cash_sign(document.category) * document.total;
                    party.apply(LedgerTransaction {
                        date: document.issue_date,
                        direction: settlement_direction(document.category),
                        description: format!("Payment on issuance of {number}"),
                        document_number: number,
                        amount: document.total,
                        doc_type: document.doc_type,
                    });
                }
            }
        }

        Ok(movements)
    }
}

/// Party-ledger direction for an ordinary posting of the given document.
fn party_direction(
    category: DocumentCategory,
    doc_type: crate::document::DocumentType,
) -> TransactionDirection {
    match category {
        DocumentCategory::Sale => {
            if doc_type.is_credit_side() {
                TransactionDirection::Credit
            } else {
                TransactionDirection::Debit
            }
        }
        DocumentCategory::Purchase => {
            if doc_type.is_credit_side() {
                TransactionDirection::Debit
            } else {
                TransactionDirection::Credit
            }
        }
    }
}

/// Direction of a settlement (payment) entry for the given side.
fn settlement_direction(category: DocumentCategory) -> TransactionDirection {
    match category {
        DocumentCategory::Sale => TransactionDirection::Credit,
        DocumentCategory::Purchase => TransactionDirection::Debit,
    }
}

/// Sign of a cash-register movement for the given side: sales bring cash
/// in, purchases pay it out.
fn cash_sign(category: DocumentCategory) -> Decimal {
    match category {
        DocumentCategory::Sale => Decimal::ONE,
        DocumentCategory::Purchase => Decimal::NEGATIVE_ONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentStatus, DocumentType, LineItem, PaymentMethod};
    use crate::ledger::types::{PartyKind, RegisterStatus};
    use chrono::{NaiveDate, Utc};
    use gestra_shared::types::money::Currency;
    use gestra_shared::types::{CashRegisterId, DocumentId, ProductId, SeriesId, WarehouseId};
    use rust_decimal_macros::dec;

    fn make_document(doc_type: DocumentType, category: DocumentCategory) -> Document {
        let party = PartyLedger::new(PartyKind::Client, "Cliente");
        Document {
            id: DocumentId::new(),
            doc_type,
            category,
            status: DocumentStatus::Pending,
            series_id: SeriesId::new(),
            sequence: Some(1),
            number: Some(format!("{} A2025/1", doc_type.prefix())),
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            party_id: party.id,
            party_name: party.name,
            items: vec![],
            subtotal: dec!(100),
            tax_total: dec!(14),
            global_discount: Decimal::ZERO,
            withholding: Decimal::ZERO,
            retention: Decimal::ZERO,
            total: dec!(114),
            paid_amount: Decimal::ZERO,
            is_certified: true,
            fingerprint: None,
            source_document_id: None,
            cash_register_id: None,
            payment_method: None,
            attachment: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn tracked_item(product: &Product, qty: Decimal) -> LineItem {
        LineItem {
            product_id: Some(product.id),
            description: product.name.clone(),
            quantity: qty,
            unit_price: dec!(10),
            discount_pct: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
        }
    }

    #[test]
    fn test_sale_invoice_posts_debit() {
        let doc = make_document(DocumentType::Ft, DocumentCategory::Sale);
        let mut party = PartyLedger::new(PartyKind::Client, "Cliente");

        let movements =
            LedgerPoster::post_certification(&doc, &mut party, None, &mut []).unwrap();

        assert!(movements.is_empty());
        assert_eq!(party.account_balance, dec!(114));
        assert_eq!(party.transactions.len(), 1);
        assert_eq!(party.transactions[0].direction, TransactionDirection::Debit);
    }

    #[test]
    fn test_sale_credit_note_posts_credit() {
        let doc = make_document(DocumentType::Nc, DocumentCategory::Sale);
        let mut party = PartyLedger::new(PartyKind::Client, "Cliente");

        LedgerPoster::post_certification(&doc, &mut party, None, &mut []).unwrap();

        assert_eq!(party.account_balance, dec!(-114));
        assert_eq!(party.transactions[0].direction, TransactionDirection::Credit);
    }

    #[test]
    fn test_purchase_invoice_credits_supplier() {
        let doc = make_document(DocumentType::Ft, DocumentCategory::Purchase);
        let mut supplier = PartyLedger::new(PartyKind::Supplier, "Fornecedor");

        LedgerPoster::post_certification(&doc, &mut supplier, None, &mut []).unwrap();

        // Credit-normal: we now owe the supplier the document total.
        assert_eq!(supplier.account_balance, dec!(114));
    }

    #[test]
    fn test_non_financial_type_posts_nothing() {
        let doc = make_document(DocumentType::Pp, DocumentCategory::Sale);
        let mut party = PartyLedger::new(PartyKind::Client, "Cliente");

        let movements =
            LedgerPoster::post_certification(&doc, &mut party, None, &mut []).unwrap();

        assert!(movements.is_empty());
        assert_eq!(party.account_balance, Decimal::ZERO);
        assert!(party.transactions.is_empty());
    }

    #[test]
    fn test_stock_tracked_lines_move_stock() {
        let warehouse = WarehouseId::new();
        let mut widget = Product::new("Widget", dec!(10), warehouse);
        let mut gadget = Product::new("Gadget", dec!(20), warehouse);

        let mut doc = make_document(DocumentType::Ft, DocumentCategory::Sale);
        doc.items = vec![tracked_item(&widget, dec!(3)), tracked_item(&gadget, dec!(5))];

        let mut party = PartyLedger::new(PartyKind::Client, "Cliente");
        let movements = LedgerPoster::post_certification(
            &doc,
            &mut party,
            None,
            &mut [&mut widget, &mut gadget],
        )
        .unwrap();

        assert_eq!(movements.len(), 2);
        assert_eq!(widget.stock, dec!(7));
        assert_eq!(gadget.stock, dec!(15));
        assert!(movements.iter().all(|m| m.direction == StockDirection::Exit));
        assert!(movements.iter().all(|m| m.document_number == "FT A2025/1"));
    }

    #[test]
    fn test_credit_note_returns_stock() {
        let warehouse = WarehouseId::new();
        let mut widget = Product::new("Widget", dec!(7), warehouse);

        let mut doc = make_document(DocumentType::Nc, DocumentCategory::Sale);
        doc.items = vec![tracked_item(&widget, dec!(3))];

        let mut party = PartyLedger::new(PartyKind::Client, "Cliente");
        let movements =
            LedgerPoster::post_certification(&doc, &mut party, None, &mut [&mut widget])
                .unwrap();

        assert_eq!(widget.stock, dec!(10));
        assert_eq!(movements[0].direction, StockDirection::Entry);
    }

    #[test]
    fn test_missing_product_fails_before_any_mutation() {
        let warehouse = WarehouseId::new();
        let mut widget = Product::new("Widget", dec!(10), warehouse);
        let phantom = ProductId::new();

        let mut doc = make_document(DocumentType::Ft, DocumentCategory::Sale);
        doc.items = vec![
            tracked_item(&widget, dec!(3)),
            LineItem {
                product_id: Some(phantom),
                description: "Phantom".into(),
                quantity: dec!(1),
                unit_price: dec!(10),
                discount_pct: Decimal::ZERO,
                tax_rate: Decimal::ZERO,
            },
        ];

        let mut party = PartyLedger::new(PartyKind::Client, "Cliente");
        let err =
            LedgerPoster::post_certification(&doc, &mut party, None, &mut [&mut widget])
                .unwrap_err();

        assert!(matches!(err, FiscalError::ProductNotFound(id) if id == phantom));
        // All-or-nothing: the first line must not have been applied.
        assert_eq!(widget.stock, dec!(10));
        assert_eq!(party.account_balance, Decimal::ZERO);
        assert!(party.transactions.is_empty());
    }

    #[test]
    fn test_payment_intent_moves_register_and_nets_balance() {
        let mut doc = make_document(DocumentType::Fr, DocumentCategory::Sale);
        doc.payment_method = Some(PaymentMethod::Cash);
        doc.cash_register_id = Some(CashRegisterId::new());

        let mut party = PartyLedger::new(PartyKind::Client, "Cliente");
        let mut register = CashRegister::new("Caixa 1", Decimal::ZERO, Currency::Aoa);

        LedgerPoster::post_certification(&doc, &mut party, Some(&mut register), &mut [])
            .unwrap();

        assert_eq!(register.balance, dec!(114));
        // Debit for the document, credit for the payment: net zero.
        assert_eq!(party.transactions.len(), 2);
        assert_eq!(party.account_balance, Decimal::ZERO);
    }

    #[test]
    fn test_liquidation_settles_and_fills_register() {
        let original = make_document(DocumentType::Ft, DocumentCategory::Sale);
        let mut receipt = make_document(DocumentType::Rg, DocumentCategory::Sale);
        receipt.number = Some("RG A2025/1".into());

        let mut party = PartyLedger::new(PartyKind::Client, "Cliente");
        let mut register = CashRegister::new("Caixa 1", Decimal::ZERO, Currency::Aoa);

        // The original was posted at certification time.
        LedgerPoster::post_certification(&original, &mut party, None, &mut []).unwrap();
        assert_eq!(party.account_balance, dec!(114));

        LedgerPoster::post_liquidation(&original, &receipt, dec!(114), &mut party, &mut register)
            .unwrap();

        assert_eq!(party.account_balance, Decimal::ZERO);
        assert_eq!(register.balance, dec!(114));
    }

    #[test]
    fn test_liquidation_into_closed_register_fails_cleanly() {
        let original = make_document(DocumentType::Ft, DocumentCategory::Sale);
        let receipt = make_document(DocumentType::Rg, DocumentCategory::Sale);

        let mut party = PartyLedger::new(PartyKind::Client, "Cliente");
        let mut register = CashRegister::new("Caixa 1", Decimal::ZERO, Currency::Aoa);
        register.status = RegisterStatus::Closed;

        let err = LedgerPoster::post_liquidation(
            &original,
            &receipt,
            dec!(114),
            &mut party,
            &mut register,
        )
        .unwrap_err();

        assert!(matches!(err, FiscalError::RegisterClosed(_)));
        assert!(party.transactions.is_empty());
        assert_eq!(register.balance, Decimal::ZERO);
    }

    #[test]
    fn test_cancellation_posting_offsets_original() {
        let original = make_document(DocumentType::Ft, DocumentCategory::Sale);
        let mut reversal = make_document(DocumentType::Nc, DocumentCategory::Sale);
        reversal.number = Some("NC A2025/1".into());
        reversal.source_document_id = Some(original.id);

        let mut party = PartyLedger::new(PartyKind::Client, "Cliente");
        LedgerPoster::post_certification(&original, &mut party, None, &mut []).unwrap();
        LedgerPoster::post_cancellation(&original, &reversal, &mut party, &mut []).unwrap();

        // The original posting stays; the reversal offsets it to zero.
        assert_eq!(party.transactions.len(), 2);
        assert_eq!(party.account_balance, Decimal::ZERO);
        assert!(party.transactions[1].description.contains("reversing FT A2025/1"));
    }
}
