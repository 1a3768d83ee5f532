pub mod db;

pub mod accounting;
pub mod instruments;
pub mod ledger;
pub mod market_data;
pub mod portfolios;
pub mod positions;
pub mod valuation;

pub mod constants;
pub mod errors;
pub mod schema;
pub mod utils;

pub use errors::{Error, Result};

pub use accounting::{apply, replay_portfolio, PositionState, ReplayState, TransactionEffect};
pub use ledger::{NewTransaction, Transaction, TxnAction};
pub use portfolios::{NewPortfolio, Portfolio};
pub use positions::{Position, RecordedTransaction};
pub use valuation::{PortfolioValuation, PositionValuation};
