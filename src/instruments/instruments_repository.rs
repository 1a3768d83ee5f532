use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::instruments::instruments_errors::InstrumentError;
use crate::instruments::instruments_model::*;
use crate::instruments::instruments_traits::InstrumentRepositoryTrait;
use crate::market_data::InstrumentProfile;
use crate::schema::instruments;
use crate::Result;

/// Repository for instrument persistence
pub struct InstrumentRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl InstrumentRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl InstrumentRepositoryTrait for InstrumentRepository {
    fn create(&self, new_instrument: NewInstrument) -> Result<Instrument> {
        new_instrument.validate().map_err(crate::Error::Instrument)?;
        let mut conn = get_connection(&self.pool)?;

        let row = InstrumentDb::from(new_instrument);
        let inserted: InstrumentDb = diesel::insert_into(instruments::table)
            .values(&row)
            .get_result(&mut conn)
            .map_err(|e| crate::Error::Instrument(InstrumentError::from(e)))?;

        Ok(Instrument::from(inserted))
    }

    fn get_by_id(&self, instrument_id: &str) -> Result<Instrument> {
        let mut conn = get_connection(&self.pool)?;

        instruments::table
            .find(instrument_id)
            .first::<InstrumentDb>(&mut conn)
            .map(Instrument::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => crate::Error::Instrument(
                    InstrumentError::NotFound(instrument_id.to_string()),
                ),
                e => crate::Error::Instrument(InstrumentError::from(e)),
            })
    }

    fn get_by_symbol(&self, symbol: &str) -> Result<Instrument> {
        let mut conn = get_connection(&self.pool)?;
        let normalized = symbol.trim().to_uppercase();

        instruments::table
            .filter(instruments::symbol.eq(&normalized))
            .first::<InstrumentDb>(&mut conn)
            .map(Instrument::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    crate::Error::Instrument(InstrumentError::NotFound(normalized.clone()))
                }
                e => crate::Error::Instrument(InstrumentError::from(e)),
            })
    }

    fn exists(&self, instrument_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;

        let count: i64 = instruments::table
            .filter(instruments::id.eq(instrument_id))
            .count()
            .get_result(&mut conn)
            .map_err(|e| crate::Error::Instrument(InstrumentError::from(e)))?;

        Ok(count > 0)
    }

    fn list(&self) -> Result<Vec<Instrument>> {
        let mut conn = get_connection(&self.pool)?;

        instruments::table
            .order(instruments::symbol.asc())
            .load::<InstrumentDb>(&mut conn)
            .map(|rows| rows.into_iter().map(Instrument::from).collect())
            .map_err(|e| crate::Error::Instrument(InstrumentError::from(e)))
    }

    fn update_profile(
        &self,
        instrument_id: &str,
        profile: &InstrumentProfile,
    ) -> Result<Instrument> {
        let mut conn = get_connection(&self.pool)?;

        let updated: InstrumentDb = diesel::update(instruments::table.find(instrument_id))
            .set((
                instruments::name.eq(profile.name.clone()),
                instruments::sector.eq(profile.sector.clone()),
                instruments::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => crate::Error::Instrument(
                    InstrumentError::NotFound(instrument_id.to_string()),
                ),
                e => crate::Error::Instrument(InstrumentError::from(e)),
            })?;

        Ok(Instrument::from(updated))
    }
}
