//! Currency codes and money rounding.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary amounts are `rust_decimal::Decimal`.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of decimal places stamped on a document total.
pub const CURRENCY_SCALE: u32 = 2;

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Angolan Kwanza
    Aoa,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
}

impl Currency {
    /// Default currency for new cash registers and documents.
    #[must_use]
    pub const fn default_currency() -> Self {
        Self::Aoa
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aoa => write!(f, "AOA"),
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "AOA" => Ok(Self::Aoa),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

/// Rounds a monetary amount to currency precision using Banker's Rounding.
///
/// Uses `RoundingStrategy::MidpointNearestEven`:
/// - Rounds 2.125 → 2.12 (to nearest even)
/// - Rounds 2.135 → 2.14 (to nearest even)
///
/// Intermediate aggregates keep full precision; this is applied exactly once,
/// at the point a document total is stamped.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Aoa.to_string(), "AOA");
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Eur.to_string(), "EUR");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("AOA").unwrap(), Currency::Aoa);
        assert_eq!(Currency::from_str("aoa").unwrap(), Currency::Aoa);
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("EUR").unwrap(), Currency::Eur);

        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }

    #[rstest]
    #[case(dec!(2.125), dec!(2.12))]
    #[case(dec!(2.135), dec!(2.14))]
    #[case(dec!(114000), dec!(114000.00))]
    #[case(dec!(99.999), dec!(100.00))]
    #[case(dec!(-2.125), dec!(-2.12))]
    fn test_round_money_bankers(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[test]
    fn test_round_money_is_idempotent() {
        let once = round_money(dec!(123.456789));
        assert_eq!(round_money(once), once);
    }
}
