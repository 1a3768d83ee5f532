use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::get_connection;
use crate::portfolios::portfolios_errors::PortfolioError;
use crate::portfolios::portfolios_model::*;
use crate::portfolios::portfolios_traits::PortfolioRepositoryTrait;
use crate::schema::portfolios;
use crate::utils::rounding::round_money;
use crate::Result;

/// Repository for portfolio persistence
pub struct PortfolioRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PortfolioRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    fn get_in_tx(&self, conn: &mut SqliteConnection, portfolio_id: &str) -> Result<Portfolio> {
        portfolios::table
            .find(portfolio_id)
            .first::<PortfolioDb>(conn)
            .map(Portfolio::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    crate::Error::Portfolio(PortfolioError::NotFound(portfolio_id.to_string()))
                }
                e => crate::Error::Portfolio(PortfolioError::from(e)),
            })
    }

    fn write_balances(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        cash_balance: Decimal,
        realized_pnl: Decimal,
    ) -> Result<Portfolio> {
        let updated: PortfolioDb = diesel::update(portfolios::table.find(portfolio_id))
            .set((
                portfolios::cash_balance.eq(cash_balance.to_string()),
                portfolios::realized_pnl.eq(realized_pnl.to_string()),
                portfolios::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result(conn)
            .map_err(|e| crate::Error::Portfolio(PortfolioError::from(e)))?;

        Ok(Portfolio::from(updated))
    }
}

impl PortfolioRepositoryTrait for PortfolioRepository {
    fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        new_portfolio.validate().map_err(crate::Error::Portfolio)?;
        let mut conn = get_connection(&self.pool)?;

        let row = PortfolioDb::from(new_portfolio);
        let inserted: PortfolioDb = diesel::insert_into(portfolios::table)
            .values(&row)
            .get_result(&mut conn)
            .map_err(|e| crate::Error::Portfolio(PortfolioError::from(e)))?;

        Ok(Portfolio::from(inserted))
    }

    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;
        self.get_in_tx(&mut conn, portfolio_id)
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;

        portfolios::table
            .filter(portfolios::owner_id.eq(owner_id))
            .order(portfolios::name.asc())
            .load::<PortfolioDb>(&mut conn)
            .map(|rows| rows.into_iter().map(Portfolio::from).collect())
            .map_err(|e| crate::Error::Portfolio(PortfolioError::from(e)))
    }

    fn list(&self) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;

        portfolios::table
            .order(portfolios::name.asc())
            .load::<PortfolioDb>(&mut conn)
            .map(|rows| rows.into_iter().map(Portfolio::from).collect())
            .map_err(|e| crate::Error::Portfolio(PortfolioError::from(e)))
    }

    fn exists(&self, portfolio_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;

        let count: i64 = portfolios::table
            .filter(portfolios::id.eq(portfolio_id))
            .count()
            .get_result(&mut conn)
            .map_err(|e| crate::Error::Portfolio(PortfolioError::from(e)))?;

        Ok(count > 0)
    }

    fn apply_deltas_in_tx(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        cash_delta: Decimal,
        realized_pnl_delta: Decimal,
    ) -> Result<Portfolio> {
        let current = self.get_in_tx(conn, portfolio_id)?;
        let cash_balance = round_money(current.cash_balance + cash_delta);
        let realized_pnl = round_money(current.realized_pnl + realized_pnl_delta);

        self.write_balances(conn, portfolio_id, cash_balance, realized_pnl)
    }

    fn set_balances_in_tx(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        cash_balance: Decimal,
        realized_pnl: Decimal,
    ) -> Result<Portfolio> {
        // Guard against writing balances for a portfolio that was deleted
        // under us.
        self.get_in_tx(conn, portfolio_id)?;
        self.write_balances(conn, portfolio_id, cash_balance, realized_pnl)
    }

    fn update_valuation(
        &self,
        portfolio_id: &str,
        total_value: Decimal,
        valued_at: DateTime<Utc>,
    ) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;

        let updated: PortfolioDb = diesel::update(portfolios::table.find(portfolio_id))
            .set((
                portfolios::total_value.eq(total_value.to_string()),
                portfolios::valued_at.eq(Some(valued_at.naive_utc())),
                portfolios::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    crate::Error::Portfolio(PortfolioError::NotFound(portfolio_id.to_string()))
                }
                e => crate::Error::Portfolio(PortfolioError::from(e)),
            })?;

        Ok(Portfolio::from(updated))
    }
}
