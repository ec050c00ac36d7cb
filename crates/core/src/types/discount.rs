//! Discount code redemption rules.
//!
//! A code is redeemable while `starts_at <= now`, `now <= ends_at` (when an
//! end is set) and `uses < max_uses` (when a cap is set).

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use super::status::DiscountKind;

/// Why a discount code cannot be redeemed right now.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountRejection {
    /// The validity window has not opened yet.
    #[error("discount is not active yet")]
    NotStarted,
    /// The validity window has closed.
    #[error("discount has expired")]
    Expired,
    /// The usage cap has been reached.
    #[error("discount usage limit reached")]
    Exhausted,
}

/// The redemption-relevant fields of a discount code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountRule {
    pub kind: DiscountKind,
    pub value: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub uses: i32,
}

impl DiscountRule {
    /// Check whether the code can be redeemed at `now`.
    ///
    /// # Errors
    ///
    /// Returns the first failing condition: window not open, window closed,
    /// or usage cap reached.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), DiscountRejection> {
        if now < self.starts_at {
            return Err(DiscountRejection::NotStarted);
        }
        if self.ends_at.is_some_and(|end| now > end) {
            return Err(DiscountRejection::Expired);
        }
        if self.max_uses.is_some_and(|max| self.uses >= max) {
            return Err(DiscountRejection::Exhausted);
        }
        Ok(())
    }

    /// Total after applying the discount to `subtotal`.
    ///
    /// Percentages above 100 behave as 100. The result is rounded to cents
    /// and never negative.
    #[must_use]
    pub fn apply(&self, subtotal: Decimal) -> Decimal {
        let reduction = match self.kind {
            DiscountKind::Percentage => {
                let pct = self.value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
                subtotal * pct / Decimal::ONE_HUNDRED
            }
            DiscountKind::Fixed => self.value.max(Decimal::ZERO),
        };

        (subtotal - reduction)
            .max(Decimal::ZERO)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn rule(kind: DiscountKind, value: Decimal) -> DiscountRule {
        DiscountRule {
            kind,
            value,
            starts_at: Utc::now() - Duration::days(1),
            ends_at: None,
            max_uses: None,
            uses: 0,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let r = rule(DiscountKind::Percentage, Decimal::new(15, 0));
        assert_eq!(r.apply(Decimal::new(20_000, 2)), Decimal::new(17_000, 2));
    }

    #[test]
    fn test_percentage_rounds_to_cents() {
        let r = rule(DiscountKind::Percentage, Decimal::new(10, 0));
        // 33.35 - 3.335 = 30.015 -> 30.02
        assert_eq!(r.apply(Decimal::new(3335, 2)), Decimal::new(3002, 2));
    }

    #[test]
    fn test_fixed_discount_never_goes_negative() {
        let r = rule(DiscountKind::Fixed, Decimal::new(5000, 2));
        assert_eq!(r.apply(Decimal::new(8000, 2)), Decimal::new(3000, 2));
        assert_eq!(r.apply(Decimal::new(2000, 2)), Decimal::ZERO);
    }

    #[test]
    fn test_percentage_over_hundred_is_free() {
        let r = rule(DiscountKind::Percentage, Decimal::new(150, 0));
        assert_eq!(r.apply(Decimal::new(999, 2)), Decimal::ZERO);
    }

    #[test]
    fn test_check_window() {
        let now = Utc::now();
        let mut r = rule(DiscountKind::Fixed, Decimal::ONE);

        r.starts_at = now + Duration::hours(1);
        assert_eq!(r.check(now), Err(DiscountRejection::NotStarted));

        r.starts_at = now - Duration::days(10);
        r.ends_at = Some(now - Duration::days(1));
        assert_eq!(r.check(now), Err(DiscountRejection::Expired));

        r.ends_at = Some(now + Duration::days(1));
        assert_eq!(r.check(now), Ok(()));
    }

    #[test]
    fn test_check_usage_cap() {
        let now = Utc::now();
        let mut r = rule(DiscountKind::Fixed, Decimal::ONE);
        r.max_uses = Some(3);
        r.uses = 2;
        assert_eq!(r.check(now), Ok(()));
        r.uses = 3;
        assert_eq!(r.check(now), Err(DiscountRejection::Exhausted));
    }
}
