use chrono::{DateTime, Utc};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use crate::accounting::{PositionState, ReplayState};
use crate::ledger::NewTransaction;
use crate::Result;

use super::positions_model::{Position, RecordedTransaction};

/// Trait defining the contract for position persistence.
pub trait PositionRepositoryTrait: Send + Sync {
    fn get(&self, portfolio_id: &str, instrument_id: &str) -> Result<Option<Position>>;
    fn get_in_tx(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        instrument_id: &str,
    ) -> Result<Option<Position>>;
    fn list_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<Position>>;

    /// Inserts or updates the accounting fields of one position inside the
    /// caller's database transaction. Valuation fields are untouched.
    fn upsert_in_tx(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        instrument_id: &str,
        state: &PositionState,
    ) -> Result<Position>;

    fn delete_all_in_tx(&self, conn: &mut SqliteConnection, portfolio_id: &str) -> Result<usize>;
    fn delete(&self, portfolio_id: &str, instrument_id: &str) -> Result<usize>;

    fn update_valuation(
        &self,
        portfolio_id: &str,
        instrument_id: &str,
        market_value: Decimal,
        unrealized_pnl: Decimal,
        valued_at: DateTime<Utc>,
    ) -> Result<Position>;
}

/// Trait defining the contract for position materialization.
pub trait PositionServiceTrait: Send + Sync {
    /// Appends a transaction to the ledger and folds it into the
    /// materialized state, all inside one database transaction.
    fn record_transaction(&self, new_transaction: NewTransaction) -> Result<RecordedTransaction>;

    /// Current accounting state for one instrument; the zero state if the
    /// instrument has never traded in this portfolio.
    fn get_position_state(&self, portfolio_id: &str, instrument_id: &str) -> Result<PositionState>;

    fn get_holdings(&self, portfolio_id: &str) -> Result<Vec<Position>>;

    /// Discards the materialized rows and refolds the full ledger.
    fn rebuild_portfolio(&self, portfolio_id: &str) -> Result<ReplayState>;

    /// Replays the ledger and compares it to the materialized state,
    /// failing on the first divergence.
    fn verify_portfolio(&self, portfolio_id: &str) -> Result<()>;

    /// Removes a materialized row whose position is flat. Rows with open
    /// quantity are protected.
    fn remove_flat_position(&self, portfolio_id: &str, instrument_id: &str) -> Result<()>;
}
