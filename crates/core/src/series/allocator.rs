//! Sequence allocation for document numbering.
//!
//! Allocation and series-state update are a single atomic step: the caller
//! holds the series lock, the counter is read (defaulting to 0), incremented
//! by exactly 1 and stored before the formatted number is returned. Failures
//! happen before any mutation.

use crate::document::DocumentType;
use crate::error::FiscalError;

use super::types::{DocumentSeries, SeriesKind};

/// A freshly allocated (or adopted) document number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedNumber {
    /// The per-type sequence value.
    pub sequence: u64,
    /// The formatted legal number, e.g. `FT A2025/1`.
    pub formatted: String,
}

/// Per-series sequence allocator.
///
/// Pure counter logic; the lifecycle supplies the fiscal-year context and
/// holds the series lock around each call.
pub struct SequenceAllocator;

impl SequenceAllocator {
    /// Allocates the next number for `doc_type` on a `Normal` series.
    ///
    /// # Errors
    ///
    /// - `SeriesInactive` if the series is disabled
    /// - `SeriesExpired` if the series year does not match `fiscal_year`
    /// - `ManualSeriesAutoAllocation` if the series is `Manual`
    pub fn allocate(
        series: &mut DocumentSeries,
        doc_type: DocumentType,
        fiscal_year: i32,
    ) -> Result<AllocatedNumber, FiscalError> {
        Self::check_usable(series, fiscal_year)?;

        if series.kind == SeriesKind::Manual {
            return Err(FiscalError::ManualSeriesAutoAllocation(series.id));
        }

        let sequence = series.last_sequence(doc_type) + 1;
        series.sequences.insert(doc_type, sequence);
        series.current_sequence += 1;

        Ok(AllocatedNumber {
            sequence,
            formatted: Self::format(series, doc_type, sequence),
        })
    }

    /// Adopts an externally supplied number on a `Manual` series.
    ///
    /// The number is recorded unchanged; a duplicate within the same
    /// `(series, type)` is rejected. Collisions against numbers generated
    /// by other series are not checked: the allocator trusts manual input.
    ///
    /// # Errors
    ///
    /// - `SeriesInactive` / `SeriesExpired` as for [`Self::allocate`]
    /// - `Validation` if the series is `Normal` or the number is blank
    /// - `DuplicateManualNumber` if the number was already adopted
    pub fn adopt_manual(
        series: &mut DocumentSeries,
        doc_type: DocumentType,
        number: &str,
        fiscal_year: i32,
    ) -> Result<AllocatedNumber, FiscalError> {
        Self::check_usable(series, fiscal_year)?;

        if series.kind == SeriesKind::Normal {
            return Err(FiscalError::Validation(format!(
                "series {} auto-numbers documents: a manual number cannot be supplied",
                series.code
            )));
        }

        let number = number.trim();
        if number.is_empty() {
            return Err(FiscalError::Validation(
                "manual document number must not be empty".to_string(),
            ));
        }

        let used = series.manual_numbers.entry(doc_type).or_default();
        if !used.insert(number.to_string()) {
            return Err(FiscalError::DuplicateManualNumber {
                series_id: series.id,
                number: number.to_string(),
            });
        }
        series.current_sequence += 1;

        Ok(AllocatedNumber {
            sequence: series.current_sequence,
            formatted: number.to_string(),
        })
    }

    fn check_usable(series: &DocumentSeries, fiscal_year: i32) -> Result<(), FiscalError> {
        if !series.is_active {
            return Err(FiscalError::SeriesInactive(series.id));
        }
        if series.fiscal_year != fiscal_year {
            return Err(FiscalError::SeriesExpired {
                series_year: series.fiscal_year,
                fiscal_year,
            });
        }
        Ok(())
    }

    fn format(series: &DocumentSeries, doc_type: DocumentType, sequence: u64) -> String {
        format!(
            "{} {}{}/{}",
            doc_type.prefix(),
            series.code,
            series.fiscal_year,
            sequence
        )
    }
}
