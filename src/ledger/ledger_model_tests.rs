#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    use crate::ledger::*;

    fn new_txn(action: &str, instrument_id: Option<&str>) -> NewTransaction {
        NewTransaction {
            id: None,
            portfolio_id: "pf-1".to_string(),
            instrument_id: instrument_id.map(String::from),
            action: action.to_string(),
            txn_time: Utc::now(),
            quantity: dec!(1),
            unit_price: dec!(10),
            fees: Decimal::ZERO,
            split_ratio: None,
            note: None,
        }
    }

    #[test]
    fn instrument_actions_are_exactly_the_position_touching_kinds() {
        for action in INSTRUMENT_ACTIONS {
            let parsed = TxnAction::from_str(action).unwrap();
            assert!(parsed.requires_instrument(), "{} must need an instrument", action);
        }
        for action in [ACTION_CASH_IN, ACTION_CASH_OUT, ACTION_FEE, ACTION_INTEREST] {
            let parsed = TxnAction::from_str(action).unwrap();
            assert!(!parsed.requires_instrument(), "{} is a cash event", action);
        }
    }

    #[test]
    fn trades_must_reference_an_instrument() {
        assert!(new_txn(ACTION_BUY_TO_OPEN, None).validate().is_err());
        assert!(new_txn(ACTION_BUY_TO_OPEN, Some("AAPL")).validate().is_ok());
    }

    #[test]
    fn cash_events_must_not_reference_an_instrument() {
        assert!(new_txn(ACTION_CASH_IN, Some("AAPL")).validate().is_err());
        assert!(new_txn(ACTION_CASH_IN, None).validate().is_ok());
    }

    #[test]
    fn split_ratio_is_only_valid_on_splits() {
        let mut buy = new_txn(ACTION_BUY_TO_OPEN, Some("AAPL"));
        buy.split_ratio = Some(dec!(2));
        assert!(buy.validate().is_err());

        let mut split = new_txn(ACTION_SPLIT, Some("AAPL"));
        assert!(split.validate().is_err());
        split.split_ratio = Some(dec!(2));
        assert!(split.validate().is_ok());
    }
}
