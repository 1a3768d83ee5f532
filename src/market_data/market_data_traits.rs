use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::market_data_errors::MarketDataError;
use super::market_data_model::InstrumentProfile;

/// Price source consumed by the valuation service.
///
/// Implementations must fail with `PriceUnavailable` rather than guess a
/// price; the caller decides how to handle the gap.
pub trait PriceLookupTrait: Send + Sync {
    fn get_price(
        &self,
        instrument_id: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<Decimal, MarketDataError>;
}

/// External provider of instrument descriptive data (name, sector) and
/// symbol validation. Ingestion details live behind this seam.
#[async_trait::async_trait]
pub trait InstrumentProfileProviderTrait: Send + Sync {
    async fn get_profile(&self, symbol: &str) -> Result<InstrumentProfile, MarketDataError>;

    async fn symbol_exists(&self, symbol: &str) -> Result<bool, MarketDataError> {
        match self.get_profile(symbol).await {
            Ok(_) => Ok(true),
            Err(MarketDataError::UnknownSymbol(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
