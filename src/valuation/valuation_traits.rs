use chrono::NaiveDate;

use crate::Result;

use super::valuation_model::PortfolioValuation;

/// Trait defining the contract for portfolio valuation.
pub trait ValuationServiceTrait: Send + Sync {
    /// Values every holding of a portfolio and persists the derived
    /// fields. Pass `as_of` to value against historical prices; `None`
    /// uses the latest available ones.
    ///
    /// Valuation reads the accounting state and never alters it, so
    /// running it twice against unchanged prices is a no-op.
    fn value_portfolio(
        &self,
        portfolio_id: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<PortfolioValuation>;
}
