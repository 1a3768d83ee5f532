use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::decimal_serde::decimal_serde;

use super::portfolios_errors::PortfolioError;

/// A portfolio: one cash balance, one running realized P&L total, and a
/// set of instrument positions derived from its ledger.
///
/// `total_value` and `valued_at` are valuation outputs; they are stale
/// until the valuation service runs and must never feed back into the
/// accounting state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "decimal_serde")]
    pub cash_balance: Decimal,
    #[serde(with = "decimal_serde")]
    pub realized_pnl: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_value: Decimal,
    pub valued_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for portfolios
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::portfolios)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioDb {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub cash_balance: String,
    pub realized_pnl: String,
    pub total_value: String,
    pub valued_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a portfolio
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
}

impl NewPortfolio {
    pub fn validate(&self) -> Result<(), PortfolioError> {
        if self.owner_id.trim().is_empty() {
            return Err(PortfolioError::InvalidData(
                "Owner ID cannot be empty".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(PortfolioError::InvalidData(
                "Portfolio name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<PortfolioDb> for Portfolio {
    fn from(db: PortfolioDb) -> Self {
        Self {
            id: db.id,
            owner_id: db.owner_id,
            name: db.name,
            description: db.description,
            cash_balance: parse_decimal(&db.cash_balance, "cash_balance"),
            realized_pnl: parse_decimal(&db.realized_pnl, "realized_pnl"),
            total_value: parse_decimal(&db.total_value, "total_value"),
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

impl From<NewPortfolio> for PortfolioDb {
    fn from(domain: NewPortfolio) -> Self {
        let now = Utc::now().naive_utc();
        let zero = Decimal::ZERO.to_string();

        Self {
            id: domain
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            owner_id: domain.owner_id,
            name: domain.name,
            description: domain.description,
            cash_balance: zero.clone(),
            realized_pnl: zero.clone(),
            total_value: zero,
            valued_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
