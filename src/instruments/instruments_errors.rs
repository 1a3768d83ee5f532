use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for instrument-related operations
#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("Instrument not found: {0}")]
    NotFound(String),

    #[error("Instrument already exists for symbol: {0}")]
    DuplicateSymbol(String),

    #[error("Invalid instrument data: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    DatabaseError(DieselError),
}

impl From<DieselError> for InstrumentError {
    fn from(error: DieselError) -> Self {
        match error {
            DieselError::NotFound => InstrumentError::NotFound("record not found".to_string()),
            DieselError::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                info,
            ) => InstrumentError::DuplicateSymbol(info.message().to_string()),
            e => InstrumentError::DatabaseError(e),
        }
    }
}
