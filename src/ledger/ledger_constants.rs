/// Transaction actions
///
/// Each constant is one of the supported ledger action kinds. The strings
/// are the on-disk representation and never change once written.
/// Open or extend a long position. Decreases cash, increases quantity.
pub const ACTION_BUY_TO_OPEN: &str = "BUY_TO_OPEN";

/// Close part or all of a long position. Increases cash, realizes P&L.
pub const ACTION_SELL_TO_CLOSE: &str = "SELL_TO_CLOSE";

/// Open or extend a short position. Increases cash, decreases quantity.
pub const ACTION_SELL_TO_OPEN: &str = "SELL_TO_OPEN";

/// Close part or all of a short position. Decreases cash, realizes P&L.
pub const ACTION_BUY_TO_CLOSE: &str = "BUY_TO_CLOSE";

/// Cash dividend on a held instrument. Increases cash, no position change.
pub const ACTION_DIVIDEND: &str = "DIVIDEND";

/// Stock split or reverse split. Scales quantity and per-unit cost,
/// total basis unchanged. Ratio is carried in the `split_ratio` field.
pub const ACTION_SPLIT: &str = "SPLIT";

/// Deposit of external funds into the portfolio. Increases cash.
pub const ACTION_CASH_IN: &str = "CASH_IN";

/// Withdrawal of funds from the portfolio. Decreases cash.
pub const ACTION_CASH_OUT: &str = "CASH_OUT";

/// Stand-alone fee not tied to a trade. Decreases cash.
pub const ACTION_FEE: &str = "FEE";

/// Interest credited on cash. Increases cash.
pub const ACTION_INTEREST: &str = "INTEREST";

/// Actions that reference an instrument and touch a position. Every
/// other action is a pure cash event.
pub const INSTRUMENT_ACTIONS: [&str; 6] = [
    ACTION_BUY_TO_OPEN,
    ACTION_SELL_TO_CLOSE,
    ACTION_SELL_TO_OPEN,
    ACTION_BUY_TO_CLOSE,
    ACTION_DIVIDEND,
    ACTION_SPLIT,
];
