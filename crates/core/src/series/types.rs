//! Series domain types.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use gestra_shared::types::SeriesId;

use crate::document::DocumentType;

/// How a series assigns numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// The system auto-numbers certifications.
    Normal,
    /// Numbers are supplied externally (e.g. re-imported historical data).
    Manual,
}

/// A document numbering series.
///
/// Invariant: for a `Normal` series, each per-type sequence only ever
/// increases by exactly 1 per certification event, never decreases, and is
/// never reused even after cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSeries {
    /// Unique identifier.
    pub id: SeriesId,
    /// Human name (e.g. "Série Geral 2025").
    pub name: String,
    /// Short code stamped into formatted numbers (e.g. "A").
    pub code: String,
    /// Numbering mode.
    pub kind: SeriesKind,
    /// The fiscal year this series applies to.
    pub fiscal_year: i32,
    /// Whether the series can allocate numbers.
    pub is_active: bool,
    /// Last-used sequence number per document type.
    ///
    /// Keyed by the closed [`DocumentType`] enum so exhaustiveness stays
    /// checkable; absent keys read as 0.
    pub sequences: BTreeMap<DocumentType, u64>,
    /// Legacy aggregate counter across all types, bumped on every
    /// allocation.
    pub current_sequence: u64,
    /// Numbers adopted on a manual series, per type, for duplicate checks.
    pub manual_numbers: BTreeMap<DocumentType, BTreeSet<String>>,
}

impl DocumentSeries {
    /// Creates a new active series for the given year.
    #[must_use]
    pub fn new(name: impl Into<String>, code: impl Into<String>, kind: SeriesKind, fiscal_year: i32) -> Self {
        Self {
            id: SeriesId::new(),
            name: name.into(),
            code: code.into(),
            kind,
            fiscal_year,
            is_active: true,
            sequences: BTreeMap::new(),
            current_sequence: 0,
            manual_numbers: BTreeMap::new(),
        }
    }

    /// Last-used sequence for a document type (0 if none allocated yet).
    #[must_use]
    pub fn last_sequence(&self, doc_type: DocumentType) -> u64 {
        self.sequences.get(&doc_type).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_series_starts_empty() {
        let series = DocumentSeries::new("Série Geral 2025", "A", SeriesKind::Normal, 2025);
        assert!(series.is_active);
        assert_eq!(series.current_sequence, 0);
        assert_eq!(series.last_sequence(DocumentType::Ft), 0);
        assert_eq!(series.last_sequence(DocumentType::Rg), 0);
    }
}
