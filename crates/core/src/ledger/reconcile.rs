//! Balance reconciliation for audits.
//!
//! The hot path maintains `account_balance` incrementally; this utility
//! re-derives it from the full transaction history so audit tooling can
//! detect drift. It never runs inside a posting transaction.

use rust_decimal::Decimal;
use serde::Serialize;

use gestra_shared::types::PartyId;

use super::types::PartyLedger;

/// Result of re-deriving a party balance from its history.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    /// The audited party.
    pub party_id: PartyId,
    /// The cached running balance.
    pub cached: Decimal,
    /// The balance recomputed from the transaction history.
    pub computed: Decimal,
    /// Whether cached and computed agree.
    pub is_consistent: bool,
}

/// Recomputes a party's balance by scanning its full history.
#[must_use]
pub fn reconcile(ledger: &PartyLedger) -> ReconciliationReport {
    let computed = ledger
        .transactions
        .iter()
        .fold(Decimal::ZERO, |acc, transaction| {
            acc + ledger
                .kind
                .balance_change(transaction.direction, transaction.amount)
        });

    ReconciliationReport {
        party_id: ledger.id,
        cached: ledger.account_balance,
        computed,
        is_consistent: computed == ledger.account_balance,
    }
}
