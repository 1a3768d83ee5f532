use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::decimal_serde::{decimal_serde, decimal_serde_option};

/// Market valuation of one holding at a point in time.
///
/// `price` is None only for flat positions, which are worth zero without a
/// quote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    pub instrument_id: String,
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub average_cost: Decimal,
    #[serde(with = "decimal_serde_option")]
    pub price: Option<Decimal>,
    #[serde(with = "decimal_serde")]
    pub market_value: Decimal,
    #[serde(with = "decimal_serde")]
    pub unrealized_pnl: Decimal,
}

/// Full valuation of a portfolio. All positions share the one `valued_at`
/// timestamp; a partially valued portfolio is never produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub portfolio_id: String,
    #[serde(with = "decimal_serde")]
    pub cash_balance: Decimal,
    pub positions: Vec<PositionValuation>,
    #[serde(with = "decimal_serde")]
    pub positions_value: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_value: Decimal,
    pub valued_at: DateTime<Utc>,
}
