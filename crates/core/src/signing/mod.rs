//! Certification fingerprint derivation.
//!
//! The fingerprint is a stand-in for a fiscal digital signature: a
//! deterministic SHA-256 digest over the document's immutable fields.
//! Re-signing an unmodified certified document reproduces the identical
//! fingerprint, which is what makes re-certification idempotent.

use sha2::{Digest, Sha256};

use crate::document::Document;

/// Derives certification fingerprints for finalized documents.
///
/// Pure function, no state.
pub struct HashSigner;

impl HashSigner {
    /// Computes the fingerprint over the immutable fields: number, date,
    /// party, total and line items.
    #[must_use]
    pub fn sign(document: &Document) -> String {
        let mut hasher = Sha256::new();

        if let Some(number) = &document.number {
            hasher.update(number.as_bytes());
        }
        hasher.update(b"|");
        hasher.update(document.issue_date.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(document.party_id.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(document.total.to_string().as_bytes());

        for item in &document.items {
            hasher.update(b"|");
            hasher.update(item.description.as_bytes());
            hasher.update(b";");
            hasher.update(item.quantity.to_string().as_bytes());
            hasher.update(b";");
            hasher.update(item.unit_price.to_string().as_bytes());
            hasher.update(b";");
            hasher.update(item.discount_pct.to_string().as_bytes());
            hasher.update(b";");
            hasher.update(item.tax_rate.to_string().as_bytes());
        }

        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}
