//! Monetary amounts using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(10,2)` and never touch floating point.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount in the shop currency (pesos), rounded to cents.
///
/// ```
/// use papeleria_core::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::new(Decimal::new(123_450, 2));
/// assert_eq!(price.to_string(), "$1,234.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero pesos.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount, rounding half away from zero to two decimals.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fixed = format!("{:.2}", self.0.abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, c) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        let sign = if self.0.is_sign_negative() && !self.0.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{sign}${grouped}.{cents}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_small_amounts() {
        assert_eq!(Money::ZERO.to_string(), "$0.00");
        assert_eq!(Money::new(Decimal::new(5, 1)).to_string(), "$0.50");
        assert_eq!(Money::new(Decimal::new(1999, 2)).to_string(), "$19.99");
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::new(Decimal::new(100_000, 2)).to_string(), "$1,000.00");
        assert_eq!(
            Money::new(Decimal::new(123_456_789, 2)).to_string(),
            "$1,234,567.89"
        );
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Money::new(Decimal::new(-2500, 2)).to_string(), "-$25.00");
    }

    #[test]
    fn test_rounds_to_cents() {
        assert_eq!(Money::new(Decimal::new(10_005, 3)).amount(), Decimal::new(1001, 2));
        assert_eq!(Money::new(Decimal::new(10_004, 3)).amount(), Decimal::new(1000, 2));
    }
}
