//!
//! Common types and utilities shared by the stock streamer crates.
//!
//! This crate aggregates:
//! - `error`: shared parse/validation error type `ParseError`.
//! - `result`: handy `Result<T, ParseError>` alias.
//! - `symbol`: validated ticker symbols, the symbols file parser and list serialization.
//! - `command`: console commands accepted by the interactive control loop.
//! - `endpoint`: remote quote service URL template and helpers.
//! - `quote_fields`: short property codes of the quote service and their field names.
#![warn(missing_docs)]
pub mod command;
pub mod endpoint;
pub mod error;
pub mod quote_fields;
pub mod result;
pub mod symbol;

pub use command::Command;
pub use error::ParseError;
pub use result::Result;
pub use symbol::Symbol;
