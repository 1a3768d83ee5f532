use thiserror::Error;

/// Custom error type for market data operations
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("No price available for instrument: {0}")]
    PriceUnavailable(String),
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("Provider error: {0}")]
    ProviderError(String),
}

impl From<MarketDataError> for String {
    fn from(error: MarketDataError) -> Self {
        error.to_string()
    }
}
