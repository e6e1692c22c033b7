//! Domain models of the streamer.
//!
//! - `stock`: persisted `StockRow` as read from the symbol store.
//! - `quote`: `QuoteRecord` returned by the quote service and response parsing.

pub mod quote;
pub mod stock;
