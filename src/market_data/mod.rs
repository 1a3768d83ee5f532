pub(crate) mod market_data_errors;
pub(crate) mod market_data_model;
pub(crate) mod market_data_traits;
pub mod providers;

pub use market_data_errors::MarketDataError;
pub use market_data_model::InstrumentProfile;
pub use market_data_traits::{InstrumentProfileProviderTrait, PriceLookupTrait};
pub use providers::manual_provider::ManualProvider;
