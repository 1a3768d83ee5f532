use dashmap::DashMap;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::{debug, warn};
use std::sync::{Arc, Mutex};

use crate::accounting::{engine, replay_portfolio, AccountingError, PositionState, ReplayState};
use crate::db::get_connection;
use crate::instruments::InstrumentError;
use crate::instruments::InstrumentRepositoryTrait;
use crate::ledger::{LedgerRepositoryTrait, NewTransaction};
use crate::portfolios::PortfolioRepositoryTrait;
use crate::positions::positions_errors::PositionError;
use crate::positions::positions_model::{Position, RecordedTransaction};
use crate::positions::positions_traits::{PositionRepositoryTrait, PositionServiceTrait};
use crate::Result;

/// Service that keeps the materialized positions in lockstep with the
/// ledger.
///
/// Every write for a portfolio runs under that portfolio's lock and inside
/// a single database transaction, so the ledger entry, the position row and
/// the portfolio balances always commit or roll back together. Reads are
/// not serialized.
pub struct PositionService {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    position_repository: Arc<dyn PositionRepositoryTrait>,
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    instrument_repository: Arc<dyn InstrumentRepositoryTrait>,
    portfolio_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PositionService {
    pub fn new(
        pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        position_repository: Arc<dyn PositionRepositoryTrait>,
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        instrument_repository: Arc<dyn InstrumentRepositoryTrait>,
    ) -> Self {
        Self {
            pool,
            ledger_repository,
            position_repository,
            portfolio_repository,
            instrument_repository,
            portfolio_locks: DashMap::new(),
        }
    }

    fn lock_for(&self, portfolio_id: &str) -> Arc<Mutex<()>> {
        self.portfolio_locks
            .entry(portfolio_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn check_references(&self, new_transaction: &NewTransaction) -> Result<()> {
        // Fail fast before taking the write path.
        self.portfolio_repository
            .get_by_id(&new_transaction.portfolio_id)?;

        if let Some(instrument_id) = &new_transaction.instrument_id {
            if !self.instrument_repository.exists(instrument_id)? {
                return Err(crate::Error::Instrument(InstrumentError::NotFound(
                    instrument_id.clone(),
                )));
            }
        }
        Ok(())
    }
}

impl PositionServiceTrait for PositionService {
    fn record_transaction(&self, new_transaction: NewTransaction) -> Result<RecordedTransaction> {
        self.check_references(&new_transaction)?;

        let portfolio_id = new_transaction.portfolio_id.clone();
        let lock = self.lock_for(&portfolio_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut conn = get_connection(&self.pool)?;
        let recorded = conn.transaction::<RecordedTransaction, crate::Error, _>(|conn| {
            let transaction = self
                .ledger_repository
                .append_in_tx(conn, new_transaction)?;

            let before = match &transaction.instrument_id {
                Some(instrument_id) => self
                    .position_repository
                    .get_in_tx(conn, &portfolio_id, instrument_id)?
                    .map(|p| p.state())
                    .unwrap_or_default(),
                None => PositionState::default(),
            };

            // A rejection here rolls the append back with it.
            let effect =
                engine::apply(&before, &transaction).map_err(crate::Error::Accounting)?;

            let position = match &transaction.instrument_id {
                Some(instrument_id) => Some(self.position_repository.upsert_in_tx(
                    conn,
                    &portfolio_id,
                    instrument_id,
                    &effect.position,
                )?),
                None => None,
            };

            let portfolio = self.portfolio_repository.apply_deltas_in_tx(
                conn,
                &portfolio_id,
                effect.cash_delta,
                effect.realized_pnl,
            )?;

            Ok(RecordedTransaction {
                transaction,
                position,
                portfolio,
            })
        })?;

        debug!(
            "Recorded {} #{} for portfolio {}",
            recorded.transaction.action, recorded.transaction.seq_id, portfolio_id
        );
        Ok(recorded)
    }

    fn get_position_state(&self, portfolio_id: &str, instrument_id: &str) -> Result<PositionState> {
        Ok(self
            .position_repository
            .get(portfolio_id, instrument_id)?
            .map(|p| p.state())
            .unwrap_or_default())
    }

    fn get_holdings(&self, portfolio_id: &str) -> Result<Vec<Position>> {
        self.portfolio_repository.get_by_id(portfolio_id)?;
        self.position_repository.list_by_portfolio(portfolio_id)
    }

    fn rebuild_portfolio(&self, portfolio_id: &str) -> Result<ReplayState> {
        self.portfolio_repository.get_by_id(portfolio_id)?;

        let lock = self.lock_for(portfolio_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let transactions = self.ledger_repository.replay(portfolio_id)?;
        let replayed = replay_portfolio(&transactions).map_err(crate::Error::Accounting)?;

        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<(), crate::Error, _>(|conn| {
            self.position_repository
                .delete_all_in_tx(conn, portfolio_id)?;
            for (instrument_id, state) in &replayed.positions {
                self.position_repository
                    .upsert_in_tx(conn, portfolio_id, instrument_id, state)?;
            }
            self.portfolio_repository.set_balances_in_tx(
                conn,
                portfolio_id,
                replayed.cash_balance,
                replayed.realized_pnl,
            )?;
            Ok(())
        })?;

        debug!(
            "Rebuilt portfolio {} from {} ledger entries",
            portfolio_id,
            transactions.len()
        );
        Ok(replayed)
    }

    fn verify_portfolio(&self, portfolio_id: &str) -> Result<()> {
        let portfolio = self.portfolio_repository.get_by_id(portfolio_id)?;

        let transactions = self.ledger_repository.replay(portfolio_id)?;
        let replayed = replay_portfolio(&transactions).map_err(crate::Error::Accounting)?;

        let materialized = self.position_repository.list_by_portfolio(portfolio_id)?;

        for position in &materialized {
            let expected = replayed.position(&position.instrument_id);
            if position.state() != expected {
                warn!(
                    "Position {}:{} diverges from its ledger",
                    portfolio_id, position.instrument_id
                );
                return Err(crate::Error::Accounting(
                    AccountingError::ReplayInconsistency(format!(
                        "position {} holds {} @ {} but the ledger replays to {} @ {}",
                        position.instrument_id,
                        position.quantity,
                        position.average_cost,
                        expected.quantity,
                        expected.average_cost
                    )),
                ));
            }
        }
        for instrument_id in replayed.positions.keys() {
            if !materialized
                .iter()
                .any(|p| &p.instrument_id == instrument_id)
            {
                return Err(crate::Error::Accounting(
                    AccountingError::ReplayInconsistency(format!(
                        "ledger replays a position for {} that is not materialized",
                        instrument_id
                    )),
                ));
            }
        }

        if portfolio.cash_balance != replayed.cash_balance {
            return Err(crate::Error::Accounting(
                AccountingError::ReplayInconsistency(format!(
                    "cash balance {} but the ledger replays to {}",
                    portfolio.cash_balance, replayed.cash_balance
                )),
            ));
        }
        if portfolio.realized_pnl != replayed.realized_pnl {
            return Err(crate::Error::Accounting(
                AccountingError::ReplayInconsistency(format!(
                    "realized P&L {} but the ledger replays to {}",
                    portfolio.realized_pnl, replayed.realized_pnl
                )),
            ));
        }

        Ok(())
    }

    fn remove_flat_position(&self, portfolio_id: &str, instrument_id: &str) -> Result<()> {
        let lock = self.lock_for(portfolio_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let position = self
            .position_repository
            .get(portfolio_id, instrument_id)?
            .ok_or_else(|| {
                crate::Error::Position(PositionError::NotFound(instrument_id.to_string()))
            })?;

        if !position.state().is_flat() {
            return Err(crate::Error::Position(PositionError::InvalidData(format!(
                "position {} still holds {}; close it before removing",
                instrument_id, position.quantity
            ))));
        }

        self.position_repository.delete(portfolio_id, instrument_id)?;
        Ok(())
    }
}
