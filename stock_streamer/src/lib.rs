//! Stock streamer library.
//!
//! Keeps a watch-list of ticker symbols, polls a remote quote service for the
//! whole list on a fixed interval and stores the latest price per symbol in
//! SQLite. The pieces, leaves first:
//!
//! - `store`: `Database` session provider and the `SymbolStore` operations.
//! - `quote_client`: `QuoteSource` trait and the blocking HTTP implementation.
//! - `watchlist`: `Streamer`, which keeps the watch-list and the store in step.
//! - `poller`: fixed-interval fetch/update loop.
//! - `console`: debug-mode command loop; `display`: headless table refresher.
//! - `shutdown`: cooperative cancellation and worker supervision.
//! - `config`, `args`: TOML file and command-line configuration.
#![warn(missing_docs)]
pub mod args;
pub mod config;
pub mod console;
pub mod display;
pub mod error;
pub mod model;
pub mod poller;
pub mod quote_client;
pub mod result;
pub mod shutdown;
pub mod store;
pub mod watchlist;

pub use error::StreamError;
pub use result::Result;
