//! Error types of the streamer.
//!
//! `StreamError` unifies store, transport, parsing and configuration failures
//! so every component can propagate a single error type with `?`.
use std::io;
use std::sync::PoisonError;

use stock_common::ParseError;
use thiserror::Error;

/// Unified error type of the streamer.
#[derive(Error, Debug)]
pub enum StreamError {
    /// I/O error from files or the console.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure inside a store session. The session has been rolled back.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Transport failure talking to the quote service (connect, timeout, HTTP status).
    #[error("Quote service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Quote service body is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Quote service JSON does not have the expected shape.
    #[error("Malformed quote response: {0}")]
    MalformedResponse(String),

    /// Configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration values are out of range.
    #[error("Config error: {0}")]
    Config(String),

    /// Symbols file or other input could not be parsed.
    #[error(transparent)]
    Parse(ParseError),

    /// Symbol passed to add/remove failed validation.
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(ParseError),

    /// Quote record names a symbol with no stored row.
    #[error("Quote received for unknown symbol {0}")]
    UnmatchedQuote(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl From<ParseError> for StreamError {
    fn from(err: ParseError) -> Self {
        StreamError::Parse(err)
    }
}

impl<T> From<PoisonError<T>> for StreamError {
    fn from(err: PoisonError<T>) -> Self {
        StreamError::MutexLock(err.to_string())
    }
}

impl StreamError {
    /// Transport and response-shape failures skip a poll cycle; everything else is a
    /// store or programming problem.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StreamError::Http(_) | StreamError::Json(_) | StreamError::MalformedResponse(_)
        )
    }
}
