//! Money helpers
//!
//! All cart arithmetic is done in `Decimal` so that totals are exact;
//! rounding only happens when an amount is displayed.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Round to cents, half away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `unit_price × quantity`
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Format an amount as a currency string
///
/// ```
/// use shared::money::format_amount;
/// use shared::Decimal;
///
/// assert_eq!(format_amount(Decimal::new(24, 0)), "$24.00");
/// assert_eq!(format_amount(Decimal::new(12995, 3)), "$13.00");
/// ```
pub fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", round_money(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_sum_is_exact() {
        // 0.1 + 0.2 drifts in f64, not in Decimal
        assert_ne!(0.1_f64 + 0.2_f64, 0.3);
        assert_eq!(
            Decimal::new(1, 1) + Decimal::new(2, 1),
            Decimal::new(3, 1)
        );
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(Decimal::new(1099, 2), 3), Decimal::new(3297, 2));
        assert_eq!(line_total(Decimal::new(1299, 2), 0), Decimal::ZERO);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_money(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round_money(Decimal::new(1004, 3)), Decimal::new(100, 2));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::ZERO), "$0.00");
        assert_eq!(format_amount(Decimal::new(3297, 2)), "$32.97");
        assert_eq!(format_amount(Decimal::new(5, 1)), "$0.50");
    }
}
