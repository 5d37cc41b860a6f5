//! Ledger entity types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gestra_shared::types::money::Currency;
use gestra_shared::types::{
    CashRegisterId, PartyId, ProductId, StockMovementId, WarehouseId,
};

use crate::document::{DocumentType, StockDirection};

/// Direction of a party-ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

/// Which side of the business a party sits on.
///
/// Clients are debit-normal (balance = debits - credits: what they owe us);
/// suppliers are credit-normal (credits - debits: what we owe them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    /// A client account.
    Client,
    /// A supplier account.
    Supplier,
}

impl PartyKind {
    /// Balance change contributed by a transaction of the given direction.
    #[must_use]
    pub fn balance_change(self, direction: TransactionDirection, amount: Decimal) -> Decimal {
        match (self, direction) {
            (Self::Client, TransactionDirection::Debit)
            | (Self::Supplier, TransactionDirection::Credit) => amount,
            (Self::Client, TransactionDirection::Credit)
            | (Self::Supplier, TransactionDirection::Debit) => -amount,
        }
    }
}

/// One entry in a party's append-only transaction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Transaction date.
    pub date: NaiveDate,
    /// Debit or credit.
    pub direction: TransactionDirection,
    /// Human description (document label + number).
    pub description: String,
    /// The formatted number of the originating document.
    pub document_number: String,
    /// Transaction amount (always positive; direction carries the sign).
    pub amount: Decimal,
    /// The originating document type.
    pub doc_type: DocumentType,
}

/// A client or supplier account with its running balance.
///
/// The cached `account_balance` always equals the signed sum of the
/// transaction history; it is updated incrementally inside the same
/// critical section as each append and is never an independent source of
/// truth. Full re-derivation lives in [`crate::ledger::reconcile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyLedger {
    /// Unique identifier.
    pub id: PartyId,
    /// Client or supplier.
    pub kind: PartyKind,
    /// Party name.
    pub name: String,
    /// Running account balance (derived, cached).
    pub account_balance: Decimal,
    /// Append-only transaction history.
    pub transactions: Vec<LedgerTransaction>,
}

impl PartyLedger {
    /// Creates a new party with a zero balance.
    #[must_use]
    pub fn new(kind: PartyKind, name: impl Into<String>) -> Self {
        Self {
            id: PartyId::new(),
            kind,
            name: name.into(),
            account_balance: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    /// Appends a transaction and updates the cached balance in one step.
    pub fn apply(&mut self, transaction: LedgerTransaction) {
        self.account_balance +=
            self.kind.balance_change(transaction.direction, transaction.amount);
        self.transactions.push(transaction);
    }
}

/// Cash register status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterStatus {
    /// Register accepts movements.
    Open,
    /// Register is closed.
    Closed,
}

/// A cash register.
///
/// Mutated only by the ledger poster in response to certified
/// payment-bearing documents and liquidations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashRegister {
    /// Unique identifier.
    pub id: CashRegisterId,
    /// Register name.
    pub name: String,
    /// Open or closed.
    pub status: RegisterStatus,
    /// Current balance.
    pub balance: Decimal,
    /// Balance the register was opened with.
    pub initial_balance: Decimal,
    /// Register currency.
    pub currency: Currency,
}

impl CashRegister {
    /// Creates a new open register.
    #[must_use]
    pub fn new(name: impl Into<String>, initial_balance: Decimal, currency: Currency) -> Self {
        Self {
            id: CashRegisterId::new(),
            name: name.into(),
            status: RegisterStatus::Open,
            balance: initial_balance,
            initial_balance,
            currency,
        }
    }

    /// Returns true if the register accepts movements.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == RegisterStatus::Open
    }
}

/// An inventory product with its cached stock level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Cached stock level (derived from the movement log).
    pub stock: Decimal,
    /// Default warehouse.
    pub warehouse_id: WarehouseId,
}

impl Product {
    /// Creates a new product with the given opening stock.
    #[must_use]
    pub fn new(name: impl Into<String>, stock: Decimal, warehouse_id: WarehouseId) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            stock,
            warehouse_id,
        }
    }
}

/// One entry in the append-only stock movement log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    /// Unique identifier.
    pub id: StockMovementId,
    /// Entry or exit.
    pub direction: StockDirection,
    /// The product moved.
    pub product_id: ProductId,
    /// Quantity moved (always positive; direction carries the sign).
    pub quantity: Decimal,
    /// The warehouse involved.
    pub warehouse_id: WarehouseId,
    /// The formatted number of the originating document.
    pub document_number: String,
}
