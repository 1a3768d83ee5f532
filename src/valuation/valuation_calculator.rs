use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::accounting::PositionState;
use crate::market_data::MarketDataError;
use crate::utils::rounding::round_money;

use super::valuation_model::{PortfolioValuation, PositionValuation};

/// Values one holding at the given price.
///
/// Signed throughout: a short position has a negative market value and
/// gains when the price falls. Flat positions are worth zero and need no
/// price.
pub fn value_position(
    instrument_id: &str,
    state: &PositionState,
    price: Option<Decimal>,
) -> Result<PositionValuation, MarketDataError> {
    if state.is_flat() {
        return Ok(PositionValuation {
            instrument_id: instrument_id.to_string(),
            quantity: state.quantity,
            average_cost: state.average_cost,
            price,
            market_value: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
        });
    }

    let price =
        price.ok_or_else(|| MarketDataError::PriceUnavailable(instrument_id.to_string()))?;

    Ok(PositionValuation {
        instrument_id: instrument_id.to_string(),
        quantity: state.quantity,
        average_cost: state.average_cost,
        price: Some(price),
        market_value: round_money(state.quantity * price),
        unrealized_pnl: round_money((price - state.average_cost) * state.quantity),
    })
}

/// Values a whole portfolio from already fetched prices.
///
/// Any open position without a price fails the entire valuation; partial
/// results are never returned.
pub fn value_portfolio(
    portfolio_id: &str,
    cash_balance: Decimal,
    holdings: &[(String, PositionState, Option<Decimal>)],
    valued_at: DateTime<Utc>,
) -> Result<PortfolioValuation, MarketDataError> {
    let mut positions = Vec::with_capacity(holdings.len());
    let mut positions_value = Decimal::ZERO;

    for (instrument_id, state, price) in holdings {
        let valuation = value_position(instrument_id, state, *price)?;
        positions_value += valuation.market_value;
        positions.push(valuation);
    }

    let positions_value = round_money(positions_value);
    Ok(PortfolioValuation {
        portfolio_id: portfolio_id.to_string(),
        cash_balance,
        positions,
        positions_value,
        total_value: round_money(cash_balance + positions_value),
        valued_at,
    })
}
