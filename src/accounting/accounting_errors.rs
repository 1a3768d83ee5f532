use thiserror::Error;

/// Custom error type for the accounting engine
#[derive(Debug, Error)]
pub enum AccountingError {
    /// Precondition violation. The transaction is rejected before any
    /// state changes; the caller may correct the input and retry.
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// A materialized position disagrees with a fresh ledger replay.
    /// Signals data corruption and must be surfaced, never reconciled
    /// silently.
    #[error("Replay inconsistency: {0}")]
    ReplayInconsistency(String),
}

impl From<AccountingError> for String {
    fn from(error: AccountingError) -> Self {
        error.to_string()
    }
}
