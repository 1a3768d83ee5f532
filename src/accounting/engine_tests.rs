#[cfg(test)]
mod tests {
    use crate::accounting::accounting_errors::AccountingError;
    use crate::accounting::accounting_model::PositionState;
    use crate::accounting::engine::apply;
    use crate::ledger::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn trade(action: &str, quantity: Decimal, unit_price: Decimal, fees: Decimal) -> Transaction {
        Transaction {
            seq_id: 1,
            id: "txn-1".to_string(),
            portfolio_id: "pf-1".to_string(),
            instrument_id: Some("AAPL".to_string()),
            action: action.to_string(),
            txn_time: Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap(),
            quantity,
            unit_price,
            fees,
            split_ratio: None,
            value: quantity * unit_price,
            note: None,
            created_at: Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap(),
        }
    }

    fn cash(action: &str, quantity: Decimal, unit_price: Decimal, fees: Decimal) -> Transaction {
        let mut txn = trade(action, quantity, unit_price, fees);
        txn.instrument_id = None;
        txn
    }

    fn split_txn(ratio: Decimal) -> Transaction {
        let mut txn = trade(ACTION_SPLIT, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        txn.split_ratio = Some(ratio);
        txn
    }

    fn assert_invalid(result: Result<super::super::TransactionEffect, AccountingError>, needle: &str) {
        match result {
            Err(AccountingError::InvalidTransaction(msg)) => {
                assert!(
                    msg.contains(needle),
                    "expected message containing '{}', got '{}'",
                    needle,
                    msg
                );
            }
            other => panic!("expected InvalidTransaction, got {:?}", other),
        }
    }

    #[test]
    fn buy_to_open_builds_weighted_average() {
        let flat = PositionState::default();

        let effect = apply(&flat, &trade(ACTION_BUY_TO_OPEN, dec!(10), dec!(100), dec!(0))).unwrap();
        assert_eq!(effect.position.quantity, dec!(10));
        assert_eq!(effect.position.average_cost, dec!(100));
        assert_eq!(effect.realized_pnl, Decimal::ZERO);
        assert_eq!(effect.cash_delta, dec!(-1000.00));

        let effect = apply(
            &effect.position,
            &trade(ACTION_BUY_TO_OPEN, dec!(10), dec!(200), dec!(0)),
        )
        .unwrap();
        assert_eq!(effect.position.quantity, dec!(20));
        assert_eq!(effect.position.average_cost, dec!(150));
    }

    #[test]
    fn sell_to_close_realizes_pnl_and_resets_basis_when_flat() {
        let state = PositionState::new(dec!(20), dec!(150));

        let effect = apply(
            &state,
            &trade(ACTION_SELL_TO_CLOSE, dec!(20), dec!(180), dec!(5)),
        )
        .unwrap();
        assert_eq!(effect.realized_pnl, dec!(595.00));
        assert_eq!(effect.position.quantity, Decimal::ZERO);
        assert_eq!(effect.position.average_cost, Decimal::ZERO);
        assert_eq!(effect.cash_delta, dec!(3595.00));
    }

    #[test]
    fn partial_close_leaves_basis_unchanged() {
        let state = PositionState::new(dec!(20), dec!(150));

        let effect = apply(
            &state,
            &trade(ACTION_SELL_TO_CLOSE, dec!(5), dec!(160), dec!(1)),
        )
        .unwrap();
        assert_eq!(effect.position.quantity, dec!(15));
        assert_eq!(effect.position.average_cost, dec!(150));
        assert_eq!(effect.realized_pnl, dec!(49.00));
    }

    #[test]
    fn close_exceeding_open_quantity_is_rejected() {
        let state = PositionState::new(dec!(20), dec!(150));

        assert_invalid(
            apply(&state, &trade(ACTION_SELL_TO_CLOSE, dec!(25), dec!(180), dec!(0))),
            "insufficient position",
        );
    }

    #[test]
    fn close_with_no_position_is_rejected() {
        let flat = PositionState::default();

        assert_invalid(
            apply(&flat, &trade(ACTION_SELL_TO_CLOSE, dec!(1), dec!(10), dec!(0))),
            "insufficient position",
        );
        assert_invalid(
            apply(&flat, &trade(ACTION_BUY_TO_CLOSE, dec!(1), dec!(10), dec!(0))),
            "insufficient position",
        );
    }

    #[test]
    fn opens_never_flip_an_existing_position() {
        let long = PositionState::new(dec!(10), dec!(100));
        let short = PositionState::new(dec!(-10), dec!(100));

        assert_invalid(
            apply(&short, &trade(ACTION_BUY_TO_OPEN, dec!(5), dec!(100), dec!(0))),
            "BUY_TO_CLOSE",
        );
        assert_invalid(
            apply(&long, &trade(ACTION_SELL_TO_OPEN, dec!(5), dec!(100), dec!(0))),
            "SELL_TO_CLOSE",
        );
    }

    #[test]
    fn short_open_extend_and_close_cycle() {
        let flat = PositionState::default();

        let effect = apply(&flat, &trade(ACTION_SELL_TO_OPEN, dec!(10), dec!(50), dec!(0))).unwrap();
        assert_eq!(effect.position.quantity, dec!(-10));
        assert_eq!(effect.position.average_cost, dec!(50));
        assert_eq!(effect.cash_delta, dec!(500.00));

        let effect = apply(
            &effect.position,
            &trade(ACTION_SELL_TO_OPEN, dec!(10), dec!(60), dec!(0)),
        )
        .unwrap();
        assert_eq!(effect.position.quantity, dec!(-20));
        assert_eq!(effect.position.average_cost, dec!(55));

        let effect = apply(
            &effect.position,
            &trade(ACTION_BUY_TO_CLOSE, dec!(20), dec!(50), dec!(2)),
        )
        .unwrap();
        // (55 - 50) * 20 - 2
        assert_eq!(effect.realized_pnl, dec!(98.00));
        assert_eq!(effect.position.quantity, Decimal::ZERO);
        assert_eq!(effect.position.average_cost, Decimal::ZERO);
        assert_eq!(effect.cash_delta, dec!(-1002.00));
    }

    #[test]
    fn dividend_requires_an_open_position() {
        let flat = PositionState::default();

        assert_invalid(
            apply(&flat, &trade(ACTION_DIVIDEND, dec!(10), dec!(0.5), dec!(0))),
            "no open position",
        );
    }

    #[test]
    fn dividend_credits_cash_without_touching_the_position() {
        let state = PositionState::new(dec!(10), dec!(100));

        let effect = apply(&state, &trade(ACTION_DIVIDEND, dec!(10), dec!(0.5), dec!(0.25))).unwrap();
        assert_eq!(effect.position, state);
        assert_eq!(effect.realized_pnl, dec!(4.75));
        assert_eq!(effect.cash_delta, dec!(4.75));
    }

    #[test]
    fn split_scales_quantity_and_inverse_scales_basis() {
        let state = PositionState::new(dec!(10), dec!(150));

        let effect = apply(&state, &split_txn(dec!(2))).unwrap();
        assert_eq!(effect.position.quantity, dec!(20));
        assert_eq!(effect.position.average_cost, dec!(75));
        assert_eq!(effect.realized_pnl, Decimal::ZERO);

        // Reverse split
        let effect = apply(&effect.position, &split_txn(dec!(0.25))).unwrap();
        assert_eq!(effect.position.quantity, dec!(5));
        assert_eq!(effect.position.average_cost, dec!(300));
    }

    #[test]
    fn split_rejects_missing_ratio_and_quantity_overload() {
        let state = PositionState::new(dec!(10), dec!(150));

        let mut no_ratio = split_txn(dec!(2));
        no_ratio.split_ratio = None;
        assert_invalid(apply(&state, &no_ratio), "split ratio");

        let mut overloaded = split_txn(dec!(2));
        overloaded.quantity = dec!(2);
        assert_invalid(apply(&state, &overloaded), "must be zero");
    }

    #[test]
    fn cash_movements_adjust_cash_only() {
        let flat = PositionState::default();

        let effect = apply(&flat, &cash(ACTION_CASH_IN, dec!(1000), dec!(1), dec!(0))).unwrap();
        assert_eq!(effect.cash_delta, dec!(1000.00));
        assert_eq!(effect.realized_pnl, Decimal::ZERO);
        assert_eq!(effect.position, PositionState::default());

        let effect = apply(&flat, &cash(ACTION_CASH_OUT, dec!(250), dec!(1), dec!(1.50))).unwrap();
        assert_eq!(effect.cash_delta, dec!(-251.50));
    }

    #[test]
    fn fee_uses_fees_field_with_value_fallback() {
        let flat = PositionState::default();

        let effect = apply(&flat, &cash(ACTION_FEE, dec!(0), dec!(0), dec!(9.99))).unwrap();
        assert_eq!(effect.cash_delta, dec!(-9.99));

        let effect = apply(&flat, &cash(ACTION_FEE, dec!(1), dec!(4.50), dec!(0))).unwrap();
        assert_eq!(effect.cash_delta, dec!(-4.50));

        assert_invalid(
            apply(&flat, &cash(ACTION_FEE, dec!(0), dec!(0), dec!(0))),
            "positive amount",
        );
    }

    #[test]
    fn interest_credits_cash_and_realized() {
        let flat = PositionState::default();

        let effect = apply(&flat, &cash(ACTION_INTEREST, dec!(1), dec!(12.34), dec!(0))).unwrap();
        assert_eq!(effect.cash_delta, dec!(12.34));
        assert_eq!(effect.realized_pnl, dec!(12.34));
    }

    #[test]
    fn zero_quantity_trades_are_rejected() {
        let flat = PositionState::default();

        assert_invalid(
            apply(&flat, &trade(ACTION_BUY_TO_OPEN, dec!(0), dec!(100), dec!(0))),
            "zero-quantity",
        );
    }

    #[test]
    fn negative_inputs_are_rejected() {
        let flat = PositionState::default();

        assert_invalid(
            apply(&flat, &trade(ACTION_BUY_TO_OPEN, dec!(10), dec!(100), dec!(-1))),
            "non-negative",
        );
    }

    #[test]
    fn unknown_action_kind_is_rejected() {
        let flat = PositionState::default();

        assert_invalid(
            apply(&flat, &trade("SHORT_SQUEEZE", dec!(10), dec!(100), dec!(0))),
            "unknown action",
        );
    }

    #[test]
    fn fractional_average_cost_rounds_half_even() {
        let flat = PositionState::default();

        let effect = apply(&flat, &trade(ACTION_BUY_TO_OPEN, dec!(3), dec!(100), dec!(0))).unwrap();
        let effect = apply(
            &effect.position,
            &trade(ACTION_BUY_TO_OPEN, dec!(3), dec!(100.000001), dec!(0)),
        )
        .unwrap();
        // (300 + 300.000003) / 6 rounded half-even at 6 dp
        assert_eq!(effect.position.average_cost, dec!(100.000000));
    }
}
