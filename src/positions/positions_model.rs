use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::accounting::PositionState;
use crate::ledger::Transaction;
use crate::portfolios::Portfolio;
use crate::utils::decimal_serde::decimal_serde;

/// Materialized holding for one (portfolio, instrument) pair.
///
/// The accounting fields (`quantity`, `average_cost`) are a fold of the
/// portfolio's ledger and can always be rebuilt from it; the valuation
/// fields (`market_value`, `unrealized_pnl`, `valued_at`) are derived from
/// external prices and are only as fresh as `valued_at` says.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub portfolio_id: String,
    pub instrument_id: String,
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub average_cost: Decimal,
    #[serde(with = "decimal_serde")]
    pub market_value: Decimal,
    #[serde(with = "decimal_serde")]
    pub unrealized_pnl: Decimal,
    pub valued_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    /// The accounting state this row materializes.
    pub fn state(&self) -> PositionState {
        PositionState::new(self.quantity, self.average_cost)
    }
}

/// Database model for positions
#[derive(Queryable, Selectable, Identifiable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionDb {
    pub id: String,
    pub portfolio_id: String,
    pub instrument_id: String,
    pub quantity: String,
    pub average_cost: String,
    pub market_value: String,
    pub unrealized_pnl: String,
    pub valued_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PositionDb {
    pub fn fresh(portfolio_id: &str, instrument_id: &str, state: &PositionState) -> Self {
        let now = Utc::now().naive_utc();
        let zero = Decimal::ZERO.to_string();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            portfolio_id: portfolio_id.to_string(),
            instrument_id: instrument_id.to_string(),
            quantity: state.quantity.to_string(),
            average_cost: state.average_cost.to_string(),
            market_value: zero.clone(),
            unrealized_pnl: zero,
            valued_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<PositionDb> for Position {
    fn from(db: PositionDb) -> Self {
        Self {
            id: db.id,
            portfolio_id: db.portfolio_id,
            instrument_id: db.instrument_id,
            quantity: parse_decimal(&db.quantity, "quantity"),
            average_cost: parse_decimal(&db.average_cost, "average_cost"),
            market_value: parse_decimal(&db.market_value, "market_value"),
            unrealized_pnl: parse_decimal(&db.unrealized_pnl, "unrealized_pnl"),
            valued_at: db
                .valued_at
                .map(|t| DateTime::from_naive_utc_and_offset(t, Utc)),
            created_at: DateTime::from_naive_utc_and_offset(db.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(db.updated_at, Utc),
        }
    }
}

fn parse_decimal(s: &str, field: &str) -> Decimal {
    Decimal::from_str(s).unwrap_or_else(|e| {
        log::error!("Failed to parse stored decimal {} '{}': {}", field, s, e);
        Decimal::ZERO
    })
}

/// Everything a successful `record_transaction` committed atomically:
/// the ledger entry, the position it moved (None for cash events) and the
/// portfolio with its updated balances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordedTransaction {
    pub transaction: Transaction,
    pub position: Option<Position>,
    pub portfolio: Portfolio,
}
