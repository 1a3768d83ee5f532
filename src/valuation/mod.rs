pub(crate) mod valuation_calculator;
pub(crate) mod valuation_model;
pub(crate) mod valuation_service;
pub(crate) mod valuation_traits;

#[cfg(test)]
mod valuation_calculator_tests;

pub use valuation_calculator::{value_portfolio, value_position};
pub use valuation_model::{PortfolioValuation, PositionValuation};
pub use valuation_service::ValuationService;
pub use valuation_traits::ValuationServiceTrait;
