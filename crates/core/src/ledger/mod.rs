//! Party ledgers, cash registers, stock, and the ledger poster.
//!
//! This module implements the financial side effects of certified state
//! transitions:
//! - Party ledgers (debit-normal clients, credit-normal suppliers)
//! - Cash register balances
//! - Stock levels and the append-only movement log
//! - The poster that applies them all-or-nothing
//! - A reconciliation utility for audits

pub mod poster;
pub mod reconcile;
pub mod types;

pub use poster::LedgerPoster;
pub use reconcile::{reconcile, ReconciliationReport};
pub use types::{
    CashRegister, LedgerTransaction, PartyKind, PartyLedger, Product, RegisterStatus,
    StockMovement, TransactionDirection,
};
