//! Error types shared by the streamer crates.
//!
//! `ParseError` covers everything that can go wrong while turning user or file
//! input into typed values: ticker validation, symbols files and console lines.
use std::io;

use thiserror::Error;

/// Unified parse/validation error.
#[derive(Error, Debug)]
pub enum ParseError {
    /// I/O error while reading a symbols file or console input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Symbol string is empty after trimming.
    #[error("Symbol must not be empty")]
    EmptySymbol,

    /// Symbol is longer than the accepted maximum.
    #[error("Symbol {0:?} is longer than {1} characters")]
    SymbolTooLong(String, usize),

    /// Symbol contains a character outside the ticker alphabet.
    #[error("Symbol {symbol:?} contains invalid character {found:?}")]
    InvalidCharacter {
        /// Offending input, as received.
        symbol: String,
        /// First character that is not allowed.
        found: char,
    },

    /// A line of a symbols file could not be parsed.
    #[error("Parse symbols file error at line {line}: {reason}")]
    SymbolsFile {
        /// 1-based line number.
        line: usize,
        /// Human-readable cause.
        reason: String,
    },
}
