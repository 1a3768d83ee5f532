use serde::{Deserialize, Serialize};

/// Descriptive attributes for an instrument, fetched from an external
/// provider. Identity (the symbol) never comes from here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentProfile {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
}
