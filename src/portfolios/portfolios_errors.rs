use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for portfolio-related operations
#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("Portfolio not found: {0}")]
    NotFound(String),

    #[error("Invalid portfolio data: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    DatabaseError(DieselError),
}

impl From<DieselError> for PortfolioError {
    fn from(error: DieselError) -> Self {
        match error {
            DieselError::NotFound => PortfolioError::NotFound("record not found".to_string()),
            e => PortfolioError::DatabaseError(e),
        }
    }
}
