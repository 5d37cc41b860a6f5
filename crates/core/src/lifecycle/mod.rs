//! The document state machine orchestrator.
//!
//! Owns the `DRAFT → {PENDING, PARTIAL, PAID} → CANCELLED` state machine
//! and drives the allocator, the signer and the poster in the correct
//! order, as one logical transaction per operation.

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::DocumentLifecycle;
pub use types::{
    Cancellation, DraftDocumentInput, DraftLineInput, LiquidateInput, Liquidation, PaymentIntent,
};
