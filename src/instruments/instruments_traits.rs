use crate::market_data::InstrumentProfile;
use crate::Result;

use super::instruments_model::{Instrument, NewInstrument};

/// Trait defining the contract for instrument persistence
pub trait InstrumentRepositoryTrait: Send + Sync {
    fn create(&self, new_instrument: NewInstrument) -> Result<Instrument>;
    fn get_by_id(&self, instrument_id: &str) -> Result<Instrument>;
    fn get_by_symbol(&self, symbol: &str) -> Result<Instrument>;
    fn exists(&self, instrument_id: &str) -> Result<bool>;
    fn list(&self) -> Result<Vec<Instrument>>;
    fn update_profile(&self, instrument_id: &str, profile: &InstrumentProfile)
        -> Result<Instrument>;
}

/// Trait defining the contract for instrument operations
#[async_trait::async_trait]
pub trait InstrumentServiceTrait: Send + Sync {
    fn register_instrument(&self, new_instrument: NewInstrument) -> Result<Instrument>;
    fn get_instrument(&self, instrument_id: &str) -> Result<Instrument>;
    fn get_by_symbol(&self, symbol: &str) -> Result<Instrument>;
    fn exists(&self, instrument_id: &str) -> Result<bool>;
    fn list_instruments(&self) -> Result<Vec<Instrument>>;

    /// Returns the instrument for the symbol, registering it first if the
    /// provider recognizes the symbol.
    async fn get_or_create_by_symbol(&self, symbol: &str) -> Result<Instrument>;

    /// Refreshes descriptive attributes from the profile provider.
    async fn sync_profile(&self, instrument_id: &str) -> Result<Instrument>;
}
