use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::ledger::Transaction;

use super::accounting_errors::AccountingError;
use super::accounting_model::PositionState;
use super::engine;

/// The derived state of one portfolio as reproduced from its ledger.
///
/// Flat positions are retained with quantity zero rather than dropped, so a
/// replay matches the materialized rows one for one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayState {
    pub positions: HashMap<String, PositionState>,
    pub cash_balance: Decimal,
    pub realized_pnl: Decimal,
}

impl ReplayState {
    pub fn position(&self, instrument_id: &str) -> PositionState {
        self.positions.get(instrument_id).cloned().unwrap_or_default()
    }
}

/// Folds the accounting engine over a portfolio's ledger, starting from the
/// zero state.
///
/// The slice must already be in ledger replay order `(txn_time, seq_id)`:
/// the fold is deliberately not commutative, since average cost depends on
/// the order opens interleave with closes.
pub fn replay_portfolio(
    transactions: &[Transaction],
) -> Result<ReplayState, AccountingError> {
    let mut state = ReplayState::default();

    for txn in transactions {
        let before = match &txn.instrument_id {
            Some(instrument_id) => state.position(instrument_id),
            None => PositionState::default(),
        };

        let effect = engine::apply(&before, txn).map_err(|e| match e {
            AccountingError::InvalidTransaction(msg) => AccountingError::ReplayInconsistency(
                format!("recorded transaction {} no longer applies: {}", txn.id, msg),
            ),
            other => other,
        })?;

        if let Some(instrument_id) = &txn.instrument_id {
            state
                .positions
                .insert(instrument_id.clone(), effect.position);
        }
        state.cash_balance += effect.cash_delta;
        state.realized_pnl += effect.realized_pnl;
    }

    debug!(
        "Replayed {} transactions: {} positions, cash {}",
        transactions.len(),
        state.positions.len(),
        state.cash_balance
    );

    Ok(state)
}
