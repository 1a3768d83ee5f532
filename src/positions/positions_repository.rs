use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::accounting::PositionState;
use crate::db::get_connection;
use crate::positions::positions_errors::PositionError;
use crate::positions::positions_model::*;
use crate::positions::positions_traits::PositionRepositoryTrait;
use crate::schema::positions;
use crate::Result;

/// Repository for materialized positions
pub struct PositionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PositionRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl PositionRepositoryTrait for PositionRepository {
    fn get(&self, portfolio_id: &str, instrument_id: &str) -> Result<Option<Position>> {
        let mut conn = get_connection(&self.pool)?;
        self.get_in_tx(&mut conn, portfolio_id, instrument_id)
    }

    fn get_in_tx(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        instrument_id: &str,
    ) -> Result<Option<Position>> {
        positions::table
            .filter(positions::portfolio_id.eq(portfolio_id))
            .filter(positions::instrument_id.eq(instrument_id))
            .first::<PositionDb>(conn)
            .optional()
            .map(|row| row.map(Position::from))
            .map_err(|e| crate::Error::Position(PositionError::from(e)))
    }

    fn list_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<Position>> {
        let mut conn = get_connection(&self.pool)?;

        positions::table
            .filter(positions::portfolio_id.eq(portfolio_id))
            .order(positions::instrument_id.asc())
            .load::<PositionDb>(&mut conn)
            .map(|rows| rows.into_iter().map(Position::from).collect())
            .map_err(|e| crate::Error::Position(PositionError::from(e)))
    }

    fn upsert_in_tx(
        &self,
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        instrument_id: &str,
        state: &PositionState,
    ) -> Result<Position> {
        let row = PositionDb::fresh(portfolio_id, instrument_id, state);

        let upserted: PositionDb = diesel::insert_into(positions::table)
            .values(&row)
            .on_conflict((positions::portfolio_id, positions::instrument_id))
            .do_update()
            .set((
                positions::quantity.eq(state.quantity.to_string()),
                positions::average_cost.eq(state.average_cost.to_string()),
                positions::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result(conn)
            .map_err(|e| crate::Error::Position(PositionError::from(e)))?;

        Ok(Position::from(upserted))
    }

    fn delete_all_in_tx(&self, conn: &mut SqliteConnection, portfolio_id: &str) -> Result<usize> {
        diesel::delete(positions::table.filter(positions::portfolio_id.eq(portfolio_id)))
            .execute(conn)
            .map_err(|e| crate::Error::Position(PositionError::from(e)))
    }

    fn delete(&self, portfolio_id: &str, instrument_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        diesel::delete(
            positions::table
                .filter(positions::portfolio_id.eq(portfolio_id))
                .filter(positions::instrument_id.eq(instrument_id)),
        )
        .execute(&mut conn)
        .map_err(|e| crate::Error::Position(PositionError::from(e)))
    }

    fn update_valuation(
        &self,
        portfolio_id: &str,
        instrument_id: &str,
        market_value: Decimal,
        unrealized_pnl: Decimal,
        valued_at: DateTime<Utc>,
    ) -> Result<Position> {
        let mut conn = get_connection(&self.pool)?;

        let updated: PositionDb = diesel::update(
            positions::table
                .filter(positions::portfolio_id.eq(portfolio_id))
                .filter(positions::instrument_id.eq(instrument_id)),
        )
        .set((
            positions::market_value.eq(market_value.to_string()),
            positions::unrealized_pnl.eq(unrealized_pnl.to_string()),
            positions::valued_at.eq(Some(valued_at.naive_utc())),
            positions::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result(&mut conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => {
                crate::Error::Position(PositionError::NotFound(instrument_id.to_string()))
            }
            e => crate::Error::Position(PositionError::from(e)),
        })?;

        Ok(Position::from(updated))
    }
}
