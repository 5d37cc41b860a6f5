//! Property-based tests for the document lifecycle.
//!
//! - Numbering: per-series-per-type sequences are monotonic and never
//!   produce two documents with the same formatted number
//! - Balances: a party's cached balance always equals the signed sum of
//!   its transaction history, for any operation sequence
//! - Idempotence: re-certifying never re-posts or re-numbers

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use gestra_shared::types::money::Currency;
use gestra_shared::types::{CashRegisterId, PartyId, SeriesId};

use crate::document::{DocumentCategory, DocumentStatus, DocumentType, PaymentMethod};
use crate::ledger::reconcile;
use crate::ledger::types::{CashRegister, PartyKind, PartyLedger};
use crate::series::{DocumentSeries, SeriesKind};
use crate::store::EngineStore;

use super::service::DocumentLifecycle;
use super::types::{DraftDocumentInput, DraftLineInput, LiquidateInput};

/// What happens to a document after certification.
#[derive(Debug, Clone, Copy)]
enum FollowUp {
    /// Leave it outstanding.
    None,
    /// Pay half, then the rest.
    PayInTwo,
    /// Pay in full.
    PayFull,
    /// Cancel it.
    Cancel,
}

fn follow_up_strategy() -> impl Strategy<Value = FollowUp> {
    prop_oneof![
        Just(FollowUp::None),
        Just(FollowUp::PayInTwo),
        Just(FollowUp::PayFull),
        Just(FollowUp::Cancel),
    ]
}

/// Invoice-like sale types that auto-number and post a debit.
fn invoice_type_strategy() -> impl Strategy<Value = DocumentType> {
    prop_oneof![
        Just(DocumentType::Ft),
        Just(DocumentType::Vd),
        Just(DocumentType::Fs),
    ]
}

/// Positive amounts from 1.00 to 10,000.00.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

struct PropEnv {
    lifecycle: DocumentLifecycle,
    series_id: SeriesId,
    party_id: PartyId,
    register_id: CashRegisterId,
}

fn setup() -> PropEnv {
    let store = Arc::new(EngineStore::new());
    let series = store.insert_series(DocumentSeries::new(
        "Série Geral 2025",
        "A",
        SeriesKind::Normal,
        2025,
    ));
    let party = store.insert_party(PartyLedger::new(PartyKind::Client, "Cliente"));
    let register =
        store.insert_register(CashRegister::new("Caixa 1", Decimal::ZERO, Currency::Aoa));
    PropEnv {
        lifecycle: DocumentLifecycle::new(store),
        series_id: series.id,
        party_id: party.id,
        register_id: register.id,
    }
}

fn draft(env: &PropEnv, doc_type: DocumentType, amount: Decimal) -> DraftDocumentInput {
    DraftDocumentInput {
        doc_type,
        category: DocumentCategory::Sale,
        series_id: env.series_id,
        party_id: env.party_id,
        issue_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        items: vec![DraftLineInput {
            product_id: None,
            description: "Serviço".into(),
            quantity: Decimal::ONE,
            unit_price: amount,
            discount_pct: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
        }],
        global_discount: Decimal::ZERO,
        withholding: Decimal::ZERO,
        retention: Decimal::ZERO,
        manual_number: None,
        payment: None,
        notes: None,
    }
}

fn liquidate(env: &PropEnv, document_id: gestra_shared::types::DocumentId, amount: Decimal) {
    env.lifecycle
        .liquidate(LiquidateInput {
            document_id,
            amount,
            method: PaymentMethod::Cash,
            cash_register_id: env.register_id,
        })
        .expect("liquidation within outstanding balance");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// For any sequence of certifications, no two documents ever share a
    /// formatted number, and each per-type counter ends at exactly the
    /// count of documents of that type.
    #[test]
    fn prop_numbers_are_unique_and_contiguous(
        specs in prop::collection::vec((invoice_type_strategy(), amount_strategy()), 1..20),
    ) {
        let env = setup();
        let mut numbers = Vec::with_capacity(specs.len());

        for (doc_type, amount) in &specs {
            let doc = env.lifecycle.create(draft(&env, *doc_type, *amount)).unwrap();
            let doc = env.lifecycle.certify(doc.id).unwrap();
            numbers.push(doc.number.unwrap());
        }

        let mut deduped = numbers.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), numbers.len(), "duplicate formatted number");

        let series = env.lifecycle.store().series(env.series_id).unwrap();
        for doc_type in [DocumentType::Ft, DocumentType::Vd, DocumentType::Fs] {
            let expected = specs.iter().filter(|(t, _)| *t == doc_type).count() as u64;
            prop_assert_eq!(series.last_sequence(doc_type), expected);
        }
    }

    /// For any operation sequence, the cached balance equals the signed
    /// sum of the transaction history, and independently matches the
    /// expected net of all operations.
    #[test]
    fn prop_balance_equals_signed_history_sum(
        specs in prop::collection::vec((amount_strategy(), follow_up_strategy()), 1..12),
    ) {
        let env = setup();
        let mut expected = Decimal::ZERO;

        for (amount, follow_up) in &specs {
            let doc = env.lifecycle.create(draft(&env, DocumentType::Ft, *amount)).unwrap();
            let doc = env.lifecycle.certify(doc.id).unwrap();
            expected += doc.total;

            match follow_up {
                FollowUp::None => {}
                FollowUp::PayInTwo => {
                    let half = doc.total / Decimal::TWO;
                    let half = gestra_shared::types::money::round_money(half);
                    liquidate(&env, doc.id, half);
                    liquidate(&env, doc.id, doc.total - half);
                    expected -= doc.total;
                }
                FollowUp::PayFull => {
                    liquidate(&env, doc.id, doc.total);
                    expected -= doc.total;
                }
                FollowUp::Cancel => {
                    env.lifecycle.cancel(doc.id, "property test").unwrap();
                    expected -= doc.total;
                }
            }
        }

        let party = env.lifecycle.store().party(env.party_id).unwrap();
        let report = reconcile(&party);
        prop_assert!(report.is_consistent, "cached balance drifted from history");
        prop_assert_eq!(party.account_balance, expected);
    }

    /// Certification is idempotent: repeated calls return the identical
    /// number and fingerprint and never re-post.
    #[test]
    fn prop_certify_idempotent(amount in amount_strategy(), repeats in 1usize..5) {
        let env = setup();
        let doc = env.lifecycle.create(draft(&env, DocumentType::Ft, amount)).unwrap();
        let first = env.lifecycle.certify(doc.id).unwrap();

        for _ in 0..repeats {
            let again = env.lifecycle.certify(doc.id).unwrap();
            prop_assert_eq!(&again.number, &first.number);
            prop_assert_eq!(&again.fingerprint, &first.fingerprint);
        }

        let party = env.lifecycle.store().party(env.party_id).unwrap();
        prop_assert_eq!(party.transactions.len(), 1);

        let series = env.lifecycle.store().series(env.series_id).unwrap();
        prop_assert_eq!(series.last_sequence(DocumentType::Ft), 1);
    }

    /// A full liquidation always lands exactly on PAID with zero
    /// outstanding, whatever the amount.
    #[test]
    fn prop_exact_liquidation_reaches_paid(amount in amount_strategy()) {
        let env = setup();
        let doc = env.lifecycle.create(draft(&env, DocumentType::Ft, amount)).unwrap();
        let doc = env.lifecycle.certify(doc.id).unwrap();

        let outcome = env.lifecycle.liquidate(LiquidateInput {
            document_id: doc.id,
            amount: doc.total,
            method: PaymentMethod::Cash,
            cash_register_id: env.register_id,
        }).unwrap();

        prop_assert_eq!(outcome.document.status, DocumentStatus::Paid);
        prop_assert_eq!(outcome.document.outstanding(), Decimal::ZERO);

        let register = env.lifecycle.store().register(env.register_id).unwrap();
        prop_assert_eq!(register.balance, doc.total);
    }
}
