//! Persisted stock row.

/// One row of the `stocks` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRow {
    /// Internal identifier.
    pub id: i64,
    /// Uppercase ticker, unique.
    pub symbol: String,
    /// Last trade price as received; `None` until the first successful poll.
    pub last_trade_price: Option<String>,
    /// Change as received; `None` until a quote carries one.
    pub change: Option<String>,
}
