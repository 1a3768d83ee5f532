use chrono::{DateTime, Utc};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use crate::Result;

use super::portfolios_model::{NewPortfolio, Portfolio};

/// Trait defining the contract for portfolio persistence.
///
/// The `*_in_tx` methods run on the caller's connection so a ledger append
/// and the portfolio update it implies commit or roll back together.
pub trait PortfolioRepositoryTrait: Send + Sync {
    fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio>;
    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio>;
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Portfolio>>;
    fn list(&self) -> Result<Vec<Portfolio>>;
    fn exists(&self, portfolio_id: &str) -> Result<bool>;

    /// Adds the given deltas to the portfolio's cash balance and realized
    /// P&L inside the caller's database transaction.
    fn apply_deltas_in_tx(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        cash_delta: Decimal,
        realized_pnl_delta: Decimal,
    ) -> Result<Portfolio>;

    /// Overwrites the accounting balances, used when rebuilding from the
    /// ledger.
    fn set_balances_in_tx(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        cash_balance: Decimal,
        realized_pnl: Decimal,
    ) -> Result<Portfolio>;

    /// Stores a valuation result together with the time it was computed.
    fn update_valuation(
        &self,
        portfolio_id: &str,
        total_value: Decimal,
        valued_at: DateTime<Utc>,
    ) -> Result<Portfolio>;
}

/// Trait defining the contract for portfolio operations
pub trait PortfolioServiceTrait: Send + Sync {
    fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio>;
    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio>;
    fn exists(&self, portfolio_id: &str) -> Result<bool>;
    fn list_portfolios_for_owner(&self, owner_id: &str) -> Result<Vec<Portfolio>>;
    fn list_portfolios(&self) -> Result<Vec<Portfolio>>;
}
