pub(crate) mod accounting_errors;
pub(crate) mod accounting_model;
pub(crate) mod engine;
pub(crate) mod replay;

#[cfg(test)]
mod engine_tests;

pub use accounting_errors::AccountingError;
pub use accounting_model::{PositionState, TransactionEffect};
pub use engine::apply;
pub use replay::{replay_portfolio, ReplayState};
