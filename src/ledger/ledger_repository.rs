use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::ledger::ledger_errors::LedgerError;
use crate::ledger::ledger_model::*;
use crate::ledger::ledger_traits::LedgerRepositoryTrait;
use crate::schema::transactions;
use crate::Result;

/// Repository for the append-only transaction ledger
pub struct LedgerRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl LedgerRepositoryTrait for LedgerRepository {
    fn append_in_tx(
        &self,
        conn: &mut SqliteConnection,
        new_transaction: NewTransaction,
    ) -> Result<Transaction> {
        new_transaction.validate().map_err(crate::Error::Ledger)?;

        let row = NewTransactionDb::from(new_transaction);
        let inserted: TransactionDb = diesel::insert_into(transactions::table)
            .values(&row)
            .get_result(conn)
            .map_err(|e| crate::Error::Ledger(LedgerError::from(e)))?;

        Ok(Transaction::from(inserted))
    }

    fn replay(&self, portfolio_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        transactions::table
            .filter(transactions::portfolio_id.eq(portfolio_id))
            .order((transactions::txn_time.asc(), transactions::seq_id.asc()))
            .load::<TransactionDb>(&mut conn)
            .map(|rows| rows.into_iter().map(Transaction::from).collect())
            .map_err(|e| crate::Error::Ledger(LedgerError::from(e)))
    }

    fn list_recent(&self, portfolio_id: &str, limit: i64) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        transactions::table
            .filter(transactions::portfolio_id.eq(portfolio_id))
            .order((transactions::txn_time.desc(), transactions::seq_id.desc()))
            .limit(limit)
            .load::<TransactionDb>(&mut conn)
            .map(|rows| rows.into_iter().map(Transaction::from).collect())
            .map_err(|e| crate::Error::Ledger(LedgerError::from(e)))
    }

    fn list_recent_for_instrument(
        &self,
        portfolio_id: &str,
        instrument_id: &str,
        limit: i64,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        transactions::table
            .filter(transactions::portfolio_id.eq(portfolio_id))
            .filter(transactions::instrument_id.eq(instrument_id))
            .order((transactions::txn_time.desc(), transactions::seq_id.desc()))
            .limit(limit)
            .load::<TransactionDb>(&mut conn)
            .map(|rows| rows.into_iter().map(Transaction::from).collect())
            .map_err(|e| crate::Error::Ledger(LedgerError::from(e)))
    }
}
