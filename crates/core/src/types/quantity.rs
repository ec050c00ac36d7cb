//! Validated line-item quantities.

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The input is missing or not an integer.
    #[error("quantity must be a whole number")]
    NotANumber,
    /// The input is zero or negative.
    #[error("quantity must be positive")]
    NotPositive,
}

/// A strictly positive number of units for a cart or order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// A single unit, the default when a form omits the quantity.
    pub const ONE: Self = Self(1);

    /// Parse a form value.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotANumber`] for anything that is not an
    /// `i32`, and [`QuantityError::NotPositive`] for values below 1.
    pub fn parse(s: &str) -> Result<Self, QuantityError> {
        let n = s
            .trim()
            .parse::<i32>()
            .map_err(|_| QuantityError::NotANumber)?;
        Self::try_from(n)
    }

    /// The underlying count.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(n: i32) -> Result<Self, Self::Error> {
        if n <= 0 {
            return Err(QuantityError::NotPositive);
        }
        Ok(Self(n))
    }
}

impl From<Quantity> for i32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive() {
        assert_eq!(Quantity::parse("3").unwrap().get(), 3);
        assert_eq!(Quantity::parse(" 12 ").unwrap().get(), 12);
    }

    #[test]
    fn test_parse_rejects_non_numbers() {
        assert_eq!(Quantity::parse(""), Err(QuantityError::NotANumber));
        assert_eq!(Quantity::parse("dos"), Err(QuantityError::NotANumber));
        assert_eq!(Quantity::parse("1.5"), Err(QuantityError::NotANumber));
    }

    #[test]
    fn test_parse_rejects_zero_and_negative() {
        assert_eq!(Quantity::parse("0"), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::parse("-4"), Err(QuantityError::NotPositive));
    }
}
