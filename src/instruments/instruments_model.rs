use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CURRENCY;

use super::instruments_errors::InstrumentError;

/// A tradable instrument referenced by ledger entries and positions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: String,
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for instruments
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::instruments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentDb {
    pub id: String,
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub currency: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for registering a new instrument
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewInstrument {
    pub id: Option<String>,
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub currency: Option<String>,
}

impl NewInstrument {
    pub fn validate(&self) -> Result<(), InstrumentError> {
        if self.symbol.trim().is_empty() {
            return Err(InstrumentError::InvalidData(
                "Symbol cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<InstrumentDb> for Instrument {
    fn from(db: InstrumentDb) -> Self {
        Self {
            id: db.id,
            symbol: db.symbol,
            name: db.name,
            sector: db.sector,
            currency: db.currency,
            created_at: DateTime::from_naive_utc_and_offset(db.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(db.updated_at, Utc),
        }
    }
}

impl From<NewInstrument> for InstrumentDb {
    fn from(domain: NewInstrument) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: domain
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            symbol: domain.symbol.trim().to_uppercase(),
            name: domain.name,
            sector: domain.sector,
            currency: domain
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}
