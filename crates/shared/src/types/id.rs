//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `PartyId` where a
//! `SeriesId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(DocumentId, "Unique identifier for a fiscal document.");
typed_id!(SeriesId, "Unique identifier for a document series.");
typed_id!(PartyId, "Unique identifier for a client or supplier.");
typed_id!(CashRegisterId, "Unique identifier for a cash register.");
typed_id!(ProductId, "Unique identifier for an inventory product.");
typed_id!(StockMovementId, "Unique identifier for a stock movement.");
typed_id!(WarehouseId, "Unique identifier for a warehouse.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_ids_are_distinct_types() {
        let doc = DocumentId::new();
        let series = SeriesId::new();
        assert_ne!(doc.into_inner(), series.into_inner());
    }

    #[test]
    fn test_display_round_trip() {
        let id = PartyId::new();
        let parsed = PartyId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!(DocumentId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_ids_are_ordered() {
        // UUID v7 is time-ordered, so later ids sort after earlier ones.
        let a = ProductId::new();
        let b = ProductId::new();
        assert!(a <= b);
    }
}
