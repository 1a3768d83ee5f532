use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{MONEY_PRECISION, QUANTITY_PRECISION, QUANTITY_THRESHOLD};

/// Rounds a quantity or per-unit cost to the ledger scale.
///
/// Banker's rounding (half-even) is used everywhere a decimal is rounded
/// before persisting, so replaying the same ledger always reproduces the
/// same derived state bit for bit.
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_PRECISION, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a monetary amount (cash, P&L, market value) to the money scale.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_PRECISION, RoundingStrategy::MidpointNearestEven)
}

/// Whether a quantity is large enough to count as an open position.
pub fn is_quantity_significant(quantity: &Decimal) -> bool {
    let threshold =
        Decimal::from_str_radix(QUANTITY_THRESHOLD, 10).unwrap_or_else(|_| Decimal::new(1, 6));
    quantity.abs() >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quantity_rounding_is_half_even() {
        assert_eq!(round_quantity(dec!(0.0000005)), dec!(0.000000));
        assert_eq!(round_quantity(dec!(0.0000015)), dec!(0.000002));
        assert_eq!(round_quantity(dec!(0.0000025)), dec!(0.000002));
    }

    #[test]
    fn money_rounding_is_half_even() {
        assert_eq!(round_money(dec!(2.125)), dec!(2.12));
        assert_eq!(round_money(dec!(2.135)), dec!(2.14));
    }

    #[test]
    fn threshold_separates_flat_from_open() {
        assert!(is_quantity_significant(&dec!(0.000001)));
        assert!(is_quantity_significant(&dec!(-0.000001)));
        assert!(!is_quantity_significant(&dec!(0.0000009)));
        assert!(!is_quantity_significant(&Decimal::ZERO));
    }
}
