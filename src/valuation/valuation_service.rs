use chrono::{NaiveDate, Utc};
use log::debug;
use std::sync::Arc;

use crate::market_data::PriceLookupTrait;
use crate::portfolios::PortfolioRepositoryTrait;
use crate::positions::PositionRepositoryTrait;
use crate::Result;

use super::valuation_calculator;
use super::valuation_model::PortfolioValuation;
use super::valuation_traits::ValuationServiceTrait;

/// Service that marks portfolios to market.
///
/// Derived only: it reads cash and positions, asks the price source for
/// quotes and writes back `market_value`, `unrealized_pnl`, `total_value`
/// and `valued_at`. It never touches quantities, basis or the ledger.
pub struct ValuationService {
    position_repository: Arc<dyn PositionRepositoryTrait>,
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    price_lookup: Arc<dyn PriceLookupTrait>,
}

impl ValuationService {
    pub fn new(
        position_repository: Arc<dyn PositionRepositoryTrait>,
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        price_lookup: Arc<dyn PriceLookupTrait>,
    ) -> Self {
        Self {
            position_repository,
            portfolio_repository,
            price_lookup,
        }
    }
}

impl ValuationServiceTrait for ValuationService {
    fn value_portfolio(
        &self,
        portfolio_id: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<PortfolioValuation> {
        let portfolio = self.portfolio_repository.get_by_id(portfolio_id)?;
        let positions = self.position_repository.list_by_portfolio(portfolio_id)?;

        // Fetch every price up front so a missing quote fails the run
        // before anything is written.
        let mut holdings = Vec::with_capacity(positions.len());
        for position in &positions {
            let state = position.state();
            let price = if state.is_flat() {
                None
            } else {
                Some(
                    self.price_lookup
                        .get_price(&position.instrument_id, as_of)
                        .map_err(crate::Error::MarketData)?,
                )
            };
            holdings.push((position.instrument_id.clone(), state, price));
        }

        let valued_at = Utc::now();
        let valuation = valuation_calculator::value_portfolio(
            portfolio_id,
            portfolio.cash_balance,
            &holdings,
            valued_at,
        )
        .map_err(crate::Error::MarketData)?;

        for position_valuation in &valuation.positions {
            self.position_repository.update_valuation(
                portfolio_id,
                &position_valuation.instrument_id,
                position_valuation.market_value,
                position_valuation.unrealized_pnl,
                valued_at,
            )?;
        }
        self.portfolio_repository
            .update_valuation(portfolio_id, valuation.total_value, valued_at)?;

        debug!(
            "Valued portfolio {}: {} positions, total {}",
            portfolio_id,
            valuation.positions.len(),
            valuation.total_value
        );
        Ok(valuation)
    }
}
