use chrono::NaiveDate;
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::InstrumentProfile;
use crate::market_data::market_data_traits::{InstrumentProfileProviderTrait, PriceLookupTrait};

/// In-memory provider for manually supplied prices and profiles.
///
/// Serves two purposes: the price source for instruments no external feed
/// covers, and the standard test double for the valuation service.
#[derive(Default)]
pub struct ManualProvider {
    prices: DashMap<String, Decimal>,
    dated_prices: DashMap<(String, NaiveDate), Decimal>,
}

impl ManualProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_price(&self, instrument_id: &str, price: Decimal) {
        self.prices.insert(instrument_id.to_string(), price);
    }

    pub fn set_price_for_date(&self, instrument_id: &str, date: NaiveDate, price: Decimal) {
        self.dated_prices
            .insert((instrument_id.to_string(), date), price);
    }

    pub fn clear_price(&self, instrument_id: &str) {
        self.prices.remove(instrument_id);
    }
}

impl PriceLookupTrait for ManualProvider {
    fn get_price(
        &self,
        instrument_id: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<Decimal, MarketDataError> {
        if let Some(date) = as_of {
            if let Some(price) = self.dated_prices.get(&(instrument_id.to_string(), date)) {
                return Ok(*price);
            }
        }
        self.prices
            .get(instrument_id)
            .map(|p| *p)
            .ok_or_else(|| MarketDataError::PriceUnavailable(instrument_id.to_string()))
    }
}

#[async_trait::async_trait]
impl InstrumentProfileProviderTrait for ManualProvider {
    async fn get_profile(&self, symbol: &str) -> Result<InstrumentProfile, MarketDataError> {
        Ok(InstrumentProfile {
            symbol: symbol.to_string(),
            name: Some(symbol.to_string()),
            sector: None,
        })
    }
}
