//! Ticker symbols and helpers shared by the streamer crates.
//!
//! A [`Symbol`] is always uppercase and made of the characters a quote service
//! accepts in a ticker: ASCII letters and digits plus `.`, `-`, `^` and `=`
//! (exchange suffixes like `BRK.B`, indices like `^GSPC`, pairs like `EURUSD=X`).

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::ParseError;

/// Longest accepted ticker.
pub const MAX_SYMBOL_LEN: usize = 12;

/// Separator placed between symbols in the serialized symbol list.
pub const SYMBOL_SEPARATOR: &str = "\",\"";

/// Validated, uppercase ticker symbol.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Symbol(String);

impl Symbol {
    /// Trim, uppercase and validate `raw`.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptySymbol);
        }
        if trimmed.chars().count() > MAX_SYMBOL_LEN {
            return Err(ParseError::SymbolTooLong(trimmed.to_string(), MAX_SYMBOL_LEN));
        }
        if let Some(found) = trimmed.chars().find(|c| !is_ticker_char(*c)) {
            return Err(ParseError::InvalidCharacter {
                symbol: raw.to_string(),
                found,
            });
        }
        Ok(Symbol(trimmed.to_ascii_uppercase()))
    }

    /// Borrow the symbol text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the symbol and return the owned text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

fn is_ticker_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')
}

impl FromStr for Symbol {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::parse(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Render symbols as the serialized list sent to the quote service:
/// `AAPL","MSFT","TSLA`. The outer quotes are added when the URL is built.
pub fn join_symbols<S: AsRef<str>>(symbols: &[S]) -> String {
    symbols
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(SYMBOL_SEPARATOR)
}

/// Trait providing file parsing for symbols.
pub trait SymbolParser {
    /// Parses symbols from a buffered reader.
    ///
    /// Each non-empty line that does not start with `#` is parsed as a single
    /// `Symbol`. Returns an error naming the first line that fails.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Symbol>, ParseError>;
}

impl SymbolParser for Symbol {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, ParseError> {
        let mut symbols = Vec::new();

        for (index, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }

            match trimmed_line.parse::<Self>() {
                Ok(symbol) => {
                    if !symbols.contains(&symbol) {
                        symbols.push(symbol);
                    }
                }
                Err(e) => {
                    return Err(ParseError::SymbolsFile {
                        line: index + 1,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(symbols)
    }
}
