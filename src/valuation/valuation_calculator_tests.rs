use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::accounting::PositionState;
use crate::market_data::MarketDataError;

use super::valuation_calculator::{value_portfolio, value_position};

fn valued_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 21, 0, 0).unwrap()
}

#[test]
fn long_position_valuation() {
    let state = PositionState::new(dec!(20), dec!(150));

    let valuation = value_position("AAPL", &state, Some(dec!(180))).unwrap();
    assert_eq!(valuation.market_value, dec!(3600.00));
    assert_eq!(valuation.unrealized_pnl, dec!(600.00));
}

#[test]
fn short_position_has_negative_market_value() {
    let state = PositionState::new(dec!(-10), dec!(50));

    let valuation = value_position("GME", &state, Some(dec!(40))).unwrap();
    assert_eq!(valuation.market_value, dec!(-400.00));
    // Short gains when the price falls below the basis
    assert_eq!(valuation.unrealized_pnl, dec!(100.00));
}

#[test]
fn flat_position_is_worth_zero_without_a_price() {
    let state = PositionState::default();

    let valuation = value_position("AAPL", &state, None).unwrap();
    assert_eq!(valuation.market_value, Decimal::ZERO);
    assert_eq!(valuation.unrealized_pnl, Decimal::ZERO);
}

#[test]
fn open_position_without_a_price_fails() {
    let state = PositionState::new(dec!(5), dec!(100));

    match value_position("AAPL", &state, None) {
        Err(MarketDataError::PriceUnavailable(symbol)) => assert_eq!(symbol, "AAPL"),
        other => panic!("expected PriceUnavailable, got {:?}", other),
    }
}

#[test]
fn portfolio_total_is_cash_plus_market_values() {
    let holdings = vec![
        (
            "AAPL".to_string(),
            PositionState::new(dec!(10), dec!(100)),
            Some(dec!(120)),
        ),
        (
            "MSFT".to_string(),
            PositionState::new(dec!(5), dec!(300)),
            Some(dec!(280)),
        ),
    ];

    let valuation = value_portfolio("pf-1", dec!(2500), &holdings, valued_at()).unwrap();
    assert_eq!(valuation.positions_value, dec!(2600.00));
    assert_eq!(valuation.total_value, dec!(5100.00));
    assert_eq!(valuation.valued_at, valued_at());
    assert_eq!(valuation.positions.len(), 2);
}

#[test]
fn one_missing_price_fails_the_whole_portfolio() {
    let holdings = vec![
        (
            "AAPL".to_string(),
            PositionState::new(dec!(10), dec!(100)),
            Some(dec!(120)),
        ),
        ("MSFT".to_string(), PositionState::new(dec!(5), dec!(300)), None),
    ];

    assert!(matches!(
        value_portfolio("pf-1", dec!(2500), &holdings, valued_at()),
        Err(MarketDataError::PriceUnavailable(_))
    ));
}

#[test]
fn fractional_quantities_round_to_money_scale() {
    let state = PositionState::new(dec!(0.333333), dec!(3));

    let valuation = value_position("VT", &state, Some(dec!(3.10))).unwrap();
    // 0.333333 * 3.10 = 1.0333323, half-even to 1.03
    assert_eq!(valuation.market_value, dec!(1.03));
    assert_eq!(valuation.unrealized_pnl, dec!(0.03));
}
