use rust_decimal::Decimal;
use std::str::FromStr;

use crate::ledger::{Transaction, TxnAction};
use crate::utils::rounding::{is_quantity_significant, round_money, round_quantity};

use super::accounting_errors::AccountingError;
use super::accounting_model::{PositionState, TransactionEffect};

type Result<T> = std::result::Result<T, AccountingError>;

/// Applies one transaction to a position state.
///
/// This is a pure state-transition function: it reads nothing but its
/// arguments and touches neither the ledger nor the database, which is what
/// makes the fold replayable. All preconditions are checked before any
/// state is derived, so a rejection is always fully atomic.
///
/// Quantities and per-unit costs are rounded half-even to 6 decimal
/// places, monetary amounts to 2, before they leave this function;
/// replaying the same ledger therefore reproduces identical state.
pub fn apply(state: &PositionState, txn: &Transaction) -> Result<TransactionEffect> {
    let action = TxnAction::from_str(&txn.action)
        .map_err(|_| AccountingError::InvalidTransaction(format!(
            "unknown action kind: {}",
            txn.action
        )))?;

    if txn.quantity.is_sign_negative()
        || txn.unit_price.is_sign_negative()
        || txn.fees.is_sign_negative()
    {
        return Err(AccountingError::InvalidTransaction(
            "quantity, price and fees must be non-negative".to_string(),
        ));
    }

    match action {
        TxnAction::BuyToOpen => open_position(state, txn, Direction::Long),
        TxnAction::SellToOpen => open_position(state, txn, Direction::Short),
        TxnAction::SellToClose => close_position(state, txn, Direction::Long),
        TxnAction::BuyToClose => close_position(state, txn, Direction::Short),
        TxnAction::Dividend => dividend(state, txn),
        TxnAction::Split => split(state, txn),
        TxnAction::CashIn => cash_movement(state, txn, Decimal::ONE),
        TxnAction::CashOut => cash_movement(state, txn, Decimal::NEGATIVE_ONE),
        TxnAction::Fee => fee(state, txn),
        TxnAction::Interest => interest(state, txn),
    }
}

enum Direction {
    Long,
    Short,
}

fn require_traded_quantity(txn: &Transaction) -> Result<Decimal> {
    if !is_quantity_significant(&txn.quantity) {
        return Err(AccountingError::InvalidTransaction(
            "zero-quantity transaction".to_string(),
        ));
    }
    Ok(txn.quantity)
}

/// Opens or extends a position in the given direction. The weighted-average
/// basis is recomputed here and only here: closing actions never touch it.
fn open_position(
    state: &PositionState,
    txn: &Transaction,
    direction: Direction,
) -> Result<TransactionEffect> {
    let quantity = require_traded_quantity(txn)?;

    let signed_quantity = match direction {
        Direction::Long => {
            if state.is_short() {
                return Err(AccountingError::InvalidTransaction(
                    "position is short; close it with BUY_TO_CLOSE".to_string(),
                ));
            }
            quantity
        }
        Direction::Short => {
            if state.is_long() {
                return Err(AccountingError::InvalidTransaction(
                    "position is long; close it with SELL_TO_CLOSE".to_string(),
                ));
            }
            -quantity
        }
    };

    let new_quantity = round_quantity(state.quantity + signed_quantity);
    let new_average_cost = if new_quantity.is_zero() {
        Decimal::ZERO
    } else {
        let open_cost = state.quantity.abs() * state.average_cost;
        round_quantity((open_cost + quantity * txn.unit_price) / new_quantity.abs())
    };

    let gross = txn.quantity * txn.unit_price;
    let cash_delta = match direction {
        // A buy pays price plus fees; a short sale collects price net of fees.
        Direction::Long => round_money(-(gross + txn.fees)),
        Direction::Short => round_money(gross - txn.fees),
    };

    Ok(TransactionEffect {
        position: PositionState::new(new_quantity, new_average_cost),
        realized_pnl: Decimal::ZERO,
        cash_delta,
    })
}

/// Closes part or all of a position, realizing P&L against the existing
/// basis. The basis of the remaining units is unchanged; a full close
/// resets it to zero. A close can never flip the sign of the position.
fn close_position(
    state: &PositionState,
    txn: &Transaction,
    direction: Direction,
) -> Result<TransactionEffect> {
    let quantity = require_traded_quantity(txn)?;

    let open_quantity = match direction {
        Direction::Long => {
            if !state.is_long() {
                return Err(AccountingError::InvalidTransaction(
                    "insufficient position: no long position to close".to_string(),
                ));
            }
            state.quantity
        }
        Direction::Short => {
            if !state.is_short() {
                return Err(AccountingError::InvalidTransaction(
                    "insufficient position: no short position to close".to_string(),
                ));
            }
            state.quantity.abs()
        }
    };

    if quantity > open_quantity {
        return Err(AccountingError::InvalidTransaction(format!(
            "insufficient position: close quantity {} exceeds open quantity {}",
            quantity, open_quantity
        )));
    }

    let realized_pnl = match direction {
        Direction::Long => round_money((txn.unit_price - state.average_cost) * quantity - txn.fees),
        Direction::Short => {
            round_money((state.average_cost - txn.unit_price) * quantity - txn.fees)
        }
    };

    let signed_delta = match direction {
        Direction::Long => -quantity,
        Direction::Short => quantity,
    };
    let mut new_quantity = round_quantity(state.quantity + signed_delta);
    let mut new_average_cost = state.average_cost;
    if !is_quantity_significant(&new_quantity) {
        new_quantity = Decimal::ZERO;
        new_average_cost = Decimal::ZERO;
    }

    let gross = txn.quantity * txn.unit_price;
    let cash_delta = match direction {
        Direction::Long => round_money(gross - txn.fees),
        Direction::Short => round_money(-(gross + txn.fees)),
    };

    Ok(TransactionEffect {
        position: PositionState::new(new_quantity, new_average_cost),
        realized_pnl,
        cash_delta,
    })
}

/// Cash dividend on a held instrument: cash-equivalent credit, no change
/// to quantity or basis.
fn dividend(state: &PositionState, txn: &Transaction) -> Result<TransactionEffect> {
    if state.is_flat() {
        return Err(AccountingError::InvalidTransaction(
            "dividend on an instrument with no open position".to_string(),
        ));
    }
    let gross = txn.quantity * txn.unit_price;
    if gross.is_zero() {
        return Err(AccountingError::InvalidTransaction(
            "zero-quantity transaction".to_string(),
        ));
    }
    let credit = round_money(gross - txn.fees);

    Ok(TransactionEffect {
        position: state.clone(),
        realized_pnl: credit,
        cash_delta: credit,
    })
}

/// Stock split: scales quantity by the ratio and the per-unit basis by its
/// inverse, leaving total basis and P&L untouched.
fn split(state: &PositionState, txn: &Transaction) -> Result<TransactionEffect> {
    if state.is_flat() {
        return Err(AccountingError::InvalidTransaction(
            "split on an instrument with no open position".to_string(),
        ));
    }
    let ratio = txn.split_ratio.ok_or_else(|| {
        AccountingError::InvalidTransaction("SPLIT requires a split ratio".to_string())
    })?;
    if ratio <= Decimal::ZERO {
        return Err(AccountingError::InvalidTransaction(format!(
            "split ratio must be positive, got {}",
            ratio
        )));
    }
    if !txn.quantity.is_zero() || !txn.unit_price.is_zero() {
        return Err(AccountingError::InvalidTransaction(
            "SPLIT carries its ratio in split_ratio; quantity and price must be zero".to_string(),
        ));
    }

    let new_quantity = round_quantity(state.quantity * ratio);
    let new_average_cost = round_quantity(state.average_cost / ratio);

    Ok(TransactionEffect {
        position: PositionState::new(new_quantity, new_average_cost),
        realized_pnl: Decimal::ZERO,
        cash_delta: round_money(-txn.fees),
    })
}

/// Deposit or withdrawal of external funds. The amount is
/// `quantity * unit_price`; fees always reduce the portfolio's cash.
fn cash_movement(
    state: &PositionState,
    txn: &Transaction,
    sign: Decimal,
) -> Result<TransactionEffect> {
    let amount = txn.quantity * txn.unit_price;
    if amount <= Decimal::ZERO {
        return Err(AccountingError::InvalidTransaction(
            "cash movement requires a positive amount".to_string(),
        ));
    }
    let cash_delta = round_money(sign * amount - txn.fees);

    Ok(TransactionEffect {
        position: state.clone(),
        realized_pnl: Decimal::ZERO,
        cash_delta,
    })
}

/// Stand-alone charge. The amount lives in `fees`, falling back to
/// `quantity * unit_price` when `fees` is zero.
fn fee(state: &PositionState, txn: &Transaction) -> Result<TransactionEffect> {
    let charge = if !txn.fees.is_zero() {
        txn.fees
    } else {
        txn.quantity * txn.unit_price
    };
    if charge <= Decimal::ZERO {
        return Err(AccountingError::InvalidTransaction(
            "FEE requires a positive amount".to_string(),
        ));
    }

    Ok(TransactionEffect {
        position: state.clone(),
        realized_pnl: Decimal::ZERO,
        cash_delta: round_money(-charge),
    })
}

/// Interest credited on cash, net of fees. Counts toward realized P&L the
/// same way a dividend does.
fn interest(state: &PositionState, txn: &Transaction) -> Result<TransactionEffect> {
    let gross = txn.quantity * txn.unit_price;
    if gross <= Decimal::ZERO {
        return Err(AccountingError::InvalidTransaction(
            "INTEREST requires a positive amount".to_string(),
        ));
    }
    let credit = round_money(gross - txn.fees);

    Ok(TransactionEffect {
        position: state.clone(),
        realized_pnl: credit,
        cash_delta: credit,
    })
}
