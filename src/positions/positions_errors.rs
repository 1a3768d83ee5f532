use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for position-related operations
#[derive(Debug, Error)]
pub enum PositionError {
    #[error("Position not found for instrument: {0}")]
    NotFound(String),

    #[error("Invalid position data: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    DatabaseError(DieselError),
}

impl From<DieselError> for PositionError {
    fn from(error: DieselError) -> Self {
        match error {
            DieselError::NotFound => PositionError::NotFound("record not found".to_string()),
            e => PositionError::DatabaseError(e),
        }
    }
}
