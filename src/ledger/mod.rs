pub(crate) mod ledger_constants;
pub(crate) mod ledger_errors;
pub(crate) mod ledger_model;
pub(crate) mod ledger_repository;
pub(crate) mod ledger_traits;

#[cfg(test)]
mod ledger_model_tests;

pub use ledger_constants::*;
pub use ledger_errors::LedgerError;
pub use ledger_model::{NewTransaction, Transaction, TransactionDb, TxnAction};
pub use ledger_repository::LedgerRepository;
pub use ledger_traits::LedgerRepositoryTrait;
