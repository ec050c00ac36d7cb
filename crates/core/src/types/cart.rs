//! Cart arithmetic.

use rust_decimal::Decimal;

/// Price of one cart or order line.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Sum of `unit_price × quantity` over all lines; an empty cart totals zero.
#[must_use]
pub fn cart_total<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    lines
        .into_iter()
        .fold(Decimal::ZERO, |acc, (price, qty)| acc + line_total(price, qty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cart_is_zero() {
        assert_eq!(cart_total(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn test_total_keeps_cents_exact() {
        // 3 × 0.10 is exactly 0.30
        let lines = vec![(Decimal::new(10, 2), 3), (Decimal::new(1250, 2), 2)];
        assert_eq!(cart_total(lines), Decimal::new(2530, 2));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(Decimal::new(4599, 2), 4), Decimal::new(18396, 2));
    }
}
