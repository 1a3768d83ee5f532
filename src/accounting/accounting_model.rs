use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::decimal_serde::decimal_serde;
use crate::utils::rounding::is_quantity_significant;

/// The accounting state of one (portfolio, instrument) holding.
///
/// `quantity` is signed: positive long, negative short, zero flat.
/// `average_cost` is the weighted-average basis per unit of the currently
/// open position and is zeroed when the position goes flat.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionState {
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub average_cost: Decimal,
}

impl PositionState {
    pub fn new(quantity: Decimal, average_cost: Decimal) -> Self {
        Self {
            quantity,
            average_cost,
        }
    }

    pub fn is_flat(&self) -> bool {
        !is_quantity_significant(&self.quantity)
    }

    pub fn is_long(&self) -> bool {
        self.quantity.is_sign_positive() && is_quantity_significant(&self.quantity)
    }

    pub fn is_short(&self) -> bool {
        self.quantity.is_sign_negative() && is_quantity_significant(&self.quantity)
    }
}

/// Result of applying one transaction to a position state.
///
/// `realized_pnl` is the delta attributed to the portfolio's running
/// realized total; `cash_delta` is the signed cash movement. Both are
/// already rounded to the money scale.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEffect {
    pub position: PositionState,
    pub realized_pnl: Decimal,
    pub cash_delta: Decimal,
}
