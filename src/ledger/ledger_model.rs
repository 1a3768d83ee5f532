use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::decimal_serde::{decimal_serde, decimal_serde_option};

use super::ledger_constants::*;
use super::ledger_errors::LedgerError;

/// Domain model for an immutable ledger entry.
///
/// Once recorded a transaction is never updated or deleted; corrections are
/// offsetting entries. `seq_id` is assigned by the ledger on append and,
/// together with `txn_time`, defines the total replay order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub seq_id: i64,
    pub id: String,
    pub portfolio_id: String,
    pub instrument_id: Option<String>,
    pub action: String,
    pub txn_time: DateTime<Utc>,
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub unit_price: Decimal,
    #[serde(with = "decimal_serde")]
    pub fees: Decimal,
    #[serde(with = "decimal_serde_option")]
    pub split_ratio: Option<Decimal>,
    #[serde(with = "decimal_serde")]
    pub value: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database model for ledger entries
#[derive(Queryable, Selectable, Identifiable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(primary_key(seq_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDb {
    pub seq_id: i64,
    pub id: String,
    pub portfolio_id: String,
    pub instrument_id: Option<String>,
    pub action: String,
    pub txn_time: NaiveDateTime,
    pub quantity: String,
    pub unit_price: String,
    pub fees: String,
    pub split_ratio: Option<String>,
    pub value: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Insertable row without the database-assigned sequence id
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
pub struct NewTransactionDb {
    pub id: String,
    pub portfolio_id: String,
    pub instrument_id: Option<String>,
    pub action: String,
    pub txn_time: NaiveDateTime,
    pub quantity: String,
    pub unit_price: String,
    pub fees: String,
    pub split_ratio: Option<String>,
    pub value: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input model for recording a new transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub id: Option<String>,
    pub portfolio_id: String,
    pub instrument_id: Option<String>,
    pub action: String,
    pub txn_time: DateTime<Utc>,
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub unit_price: Decimal,
    #[serde(with = "decimal_serde")]
    pub fees: Decimal,
    #[serde(with = "decimal_serde_option")]
    pub split_ratio: Option<Decimal>,
    pub note: Option<String>,
}

impl NewTransaction {
    /// Structural validation only; the accounting engine enforces the
    /// state-dependent preconditions.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.portfolio_id.trim().is_empty() {
            return Err(LedgerError::InvalidData(
                "Portfolio ID cannot be empty".to_string(),
            ));
        }
        let action = TxnAction::from_str(&self.action)
            .map_err(|_| LedgerError::InvalidData(format!("Unknown action: {}", self.action)))?;

        if action.requires_instrument() && self.instrument_id.is_none() {
            return Err(LedgerError::InvalidData(format!(
                "Action {} requires an instrument",
                self.action
            )));
        }
        if !action.requires_instrument() && self.instrument_id.is_some() {
            return Err(LedgerError::InvalidData(format!(
                "Action {} is a cash event and cannot reference an instrument",
                self.action
            )));
        }
        if self.quantity.is_sign_negative()
            || self.unit_price.is_sign_negative()
            || self.fees.is_sign_negative()
        {
            return Err(LedgerError::InvalidData(
                "Quantity, price and fees must be non-negative".to_string(),
            ));
        }
        match action {
            TxnAction::Split => {
                if self.split_ratio.is_none() {
                    return Err(LedgerError::InvalidData(
                        "SPLIT requires a split ratio".to_string(),
                    ));
                }
            }
            _ => {
                if self.split_ratio.is_some() {
                    return Err(LedgerError::InvalidData(format!(
                        "Split ratio is only valid on SPLIT, not {}",
                        self.action
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Enum representing the supported ledger actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxnAction {
    BuyToOpen,
    SellToClose,
    SellToOpen,
    BuyToClose,
    Dividend,
    Split,
    CashIn,
    CashOut,
    Fee,
    Interest,
}

impl TxnAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnAction::BuyToOpen => ACTION_BUY_TO_OPEN,
            TxnAction::SellToClose => ACTION_SELL_TO_CLOSE,
            TxnAction::SellToOpen => ACTION_SELL_TO_OPEN,
            TxnAction::BuyToClose => ACTION_BUY_TO_CLOSE,
            TxnAction::Dividend => ACTION_DIVIDEND,
            TxnAction::Split => ACTION_SPLIT,
            TxnAction::CashIn => ACTION_CASH_IN,
            TxnAction::CashOut => ACTION_CASH_OUT,
            TxnAction::Fee => ACTION_FEE,
            TxnAction::Interest => ACTION_INTEREST,
        }
    }

    /// Whether this action kind references an instrument position.
    pub fn requires_instrument(&self) -> bool {
        INSTRUMENT_ACTIONS.contains(&self.as_str())
    }
}

impl FromStr for TxnAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            s if s == ACTION_BUY_TO_OPEN => Ok(TxnAction::BuyToOpen),
            s if s == ACTION_SELL_TO_CLOSE => Ok(TxnAction::SellToClose),
            s if s == ACTION_SELL_TO_OPEN => Ok(TxnAction::SellToOpen),
            s if s == ACTION_BUY_TO_CLOSE => Ok(TxnAction::BuyToClose),
            s if s == ACTION_DIVIDEND => Ok(TxnAction::Dividend),
            s if s == ACTION_SPLIT => Ok(TxnAction::Split),
            s if s == ACTION_CASH_IN => Ok(TxnAction::CashIn),
            s if s == ACTION_CASH_OUT => Ok(TxnAction::CashOut),
            s if s == ACTION_FEE => Ok(TxnAction::Fee),
            s if s == ACTION_INTEREST => Ok(TxnAction::Interest),
            _ => Err(format!("Unknown action: {}", s)),
        }
    }
}

// Conversion implementations
impl From<TransactionDb> for Transaction {
    fn from(db: TransactionDb) -> Self {
        Self {
            seq_id: db.seq_id,
            id: db.id,
            portfolio_id: db.portfolio_id,
            instrument_id: db.instrument_id,
            action: db.action,
            txn_time: DateTime::from_naive_utc_and_offset(db.txn_time, Utc),
            quantity: parse_decimal(&db.quantity, "quantity"),
            unit_price: parse_decimal(&db.unit_price, "unit_price"),
            fees: parse_decimal(&db.fees, "fees"),
            split_ratio: db.split_ratio.as_deref().map(|s| parse_decimal(s, "split_ratio")),
            value: parse_decimal(&db.value, "value"),
            note: db.note,
            created_at: DateTime::from_naive_utc_and_offset(db.created_at, Utc),
        }
    }
}

fn parse_decimal(s: &str, field: &str) -> Decimal {
    Decimal::from_str(s).unwrap_or_else(|e| {
        log::error!("Failed to parse stored decimal {} '{}': {}", field, s, e);
        Decimal::ZERO
    })
}

impl From<NewTransaction> for NewTransactionDb {
    fn from(domain: NewTransaction) -> Self {
        let now = Utc::now().naive_utc();
        let value = domain.quantity * domain.unit_price;

        Self {
            id: domain
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            portfolio_id: domain.portfolio_id,
            instrument_id: domain.instrument_id,
            action: domain.action,
            txn_time: domain.txn_time.naive_utc(),
            quantity: domain.quantity.to_string(),
            unit_price: domain.unit_price.to_string(),
            fees: domain.fees.to_string(),
            split_ratio: domain.split_ratio.map(|r| r.to_string()),
            value: value.to_string(),
            note: domain.note,
            created_at: now,
        }
    }
}
