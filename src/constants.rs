/// Decimal scale for quantities and per-unit cost basis
pub const QUANTITY_PRECISION: u32 = 6;

/// Decimal scale for monetary amounts (cash, P&L, market values)
pub const MONEY_PRECISION: u32 = 2;

/// Quantities below this magnitude are treated as flat
pub const QUANTITY_THRESHOLD: &str = "0.000001";

/// Default listing currency for instruments
pub const DEFAULT_CURRENCY: &str = "USD";
