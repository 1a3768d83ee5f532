use log::debug;
use std::sync::Arc;

use crate::market_data::InstrumentProfileProviderTrait;
use crate::Result;

use super::instruments_errors::InstrumentError;
use super::instruments_model::{Instrument, NewInstrument};
use super::instruments_traits::{InstrumentRepositoryTrait, InstrumentServiceTrait};

/// Service for managing the instrument catalogue
pub struct InstrumentService {
    repository: Arc<dyn InstrumentRepositoryTrait>,
    profile_provider: Arc<dyn InstrumentProfileProviderTrait>,
}

impl InstrumentService {
    pub fn new(
        repository: Arc<dyn InstrumentRepositoryTrait>,
        profile_provider: Arc<dyn InstrumentProfileProviderTrait>,
    ) -> Self {
        Self {
            repository,
            profile_provider,
        }
    }
}

#[async_trait::async_trait]
impl InstrumentServiceTrait for InstrumentService {
    fn register_instrument(&self, new_instrument: NewInstrument) -> Result<Instrument> {
        let instrument = self.repository.create(new_instrument)?;
        debug!(
            "Registered instrument {} ({})",
            instrument.symbol, instrument.id
        );
        Ok(instrument)
    }

    fn get_instrument(&self, instrument_id: &str) -> Result<Instrument> {
        self.repository.get_by_id(instrument_id)
    }

    fn get_by_symbol(&self, symbol: &str) -> Result<Instrument> {
        self.repository.get_by_symbol(symbol)
    }

    fn exists(&self, instrument_id: &str) -> Result<bool> {
        self.repository.exists(instrument_id)
    }

    fn list_instruments(&self) -> Result<Vec<Instrument>> {
        self.repository.list()
    }

    async fn get_or_create_by_symbol(&self, symbol: &str) -> Result<Instrument> {
        match self.repository.get_by_symbol(symbol) {
            Ok(instrument) => Ok(instrument),
            Err(crate::Error::Instrument(InstrumentError::NotFound(_))) => {
                let profile = self
                    .profile_provider
                    .get_profile(symbol)
                    .await
                    .map_err(crate::Error::MarketData)?;

                self.repository.create(NewInstrument {
                    id: None,
                    symbol: symbol.to_string(),
                    name: profile.name,
                    sector: profile.sector,
                    currency: None,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn sync_profile(&self, instrument_id: &str) -> Result<Instrument> {
        let instrument = self.repository.get_by_id(instrument_id)?;

        let profile = self
            .profile_provider
            .get_profile(&instrument.symbol)
            .await
            .map_err(crate::Error::MarketData)?;

        debug!("Refreshed profile for {}", instrument.symbol);
        self.repository.update_profile(instrument_id, &profile)
    }
}
