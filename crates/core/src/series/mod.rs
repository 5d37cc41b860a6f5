//! Document numbering series.
//!
//! A series is a named numbering stream (e.g. "Série Geral 2025") scoping
//! sequence numbers by fiscal year and code. Counters are kept per document
//! type, so `FT A2025/7` and `RG A2025/1` coexist in the same series.

pub mod allocator;
pub mod types;

pub use allocator::{AllocatedNumber, SequenceAllocator};
pub use types::{DocumentSeries, SeriesKind};
