use diesel::sqlite::SqliteConnection;

use super::ledger_model::{NewTransaction, Transaction};
use crate::Result;

/// Trait defining the contract for the append-only ledger.
///
/// There is deliberately no update or delete: corrections are recorded as
/// offsetting transactions.
pub trait LedgerRepositoryTrait: Send + Sync {
    /// Appends a validated transaction inside the caller's database
    /// transaction and returns it with its assigned sequence id.
    fn append_in_tx(
        &self,
        conn: &mut SqliteConnection,
        new_transaction: NewTransaction,
    ) -> Result<Transaction>;

    /// Full ledger for a portfolio in replay order `(txn_time, seq_id)`.
    fn replay(&self, portfolio_id: &str) -> Result<Vec<Transaction>>;

    /// Most recent entries first, for display.
    fn list_recent(&self, portfolio_id: &str, limit: i64) -> Result<Vec<Transaction>>;

    /// Most recent entries for one instrument, most recent first.
    fn list_recent_for_instrument(
        &self,
        portfolio_id: &str,
        instrument_id: &str,
        limit: i64,
    ) -> Result<Vec<Transaction>>;
}
