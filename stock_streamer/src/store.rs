//! SQLite-backed symbol store.
//!
//! [`Database`] is the session provider: every store operation opens its own
//! connection, works inside one transaction and releases the connection on
//! every exit path. A failing operation is rolled back before the error is
//! returned to the caller. Connections are never shared between threads.
//!
//! [`SymbolStore`] exposes the operations the watch-list and the poller need
//! on top of that provider.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::error::StreamError;
use crate::model::quote::QuoteRecord;
use crate::model::stock::StockRow;
use crate::result::Result;

/// How long a session waits on a lock held by another thread.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_STOCKS: &str = "CREATE TABLE IF NOT EXISTS stocks (
    id INTEGER PRIMARY KEY,
    symbol TEXT NOT NULL UNIQUE,
    last_trade_price TEXT,
    change TEXT
)";
const INSERT_STOCK: &str = "INSERT INTO stocks (symbol) VALUES (?1)";
const UPDATE_QUOTE: &str = "UPDATE stocks
    SET last_trade_price = ?2, change = COALESCE(?3, change)
    WHERE symbol = ?1";
const DELETE_STOCK: &str = "DELETE FROM stocks WHERE symbol = ?1";
const FIND_STOCK: &str =
    "SELECT id, symbol, last_trade_price, change FROM stocks WHERE symbol = ?1";
const LIST_STOCKS: &str = "SELECT id, symbol, last_trade_price, change FROM stocks ORDER BY id";
const COUNT_STOCKS: &str = "SELECT COUNT(*) FROM stocks";

/// Session provider for the stocks database.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    echo: bool,
}

impl Database {
    /// Provider for the SQLite file at `path`. With `echo`, every statement is logged.
    pub fn new(path: impl Into<PathBuf>, echo: bool) -> Self {
        Self {
            path: path.into(),
            echo,
        }
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and the `stocks` table when missing.
    pub fn init_schema(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.with_session(|session| {
            self.echo(CREATE_STOCKS);
            session.execute_batch(CREATE_STOCKS)?;
            Ok(())
        })
    }

    /// Run `f` inside a scoped session.
    ///
    /// Commits when `f` succeeds, rolls back when it fails. The connection is
    /// dropped before this returns in both cases.
    pub fn with_session<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.connect()?;
        let session = conn.transaction()?;
        match f(&session) {
            Ok(value) => {
                session.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = session.rollback() {
                    warn!("Rollback failed after {}: {}", e, rollback_err);
                }
                Err(e)
            }
        }
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    fn echo(&self, sql: &str) {
        if self.echo {
            info!("SQL: {}", sql.split_whitespace().collect::<Vec<_>>().join(" "));
        }
    }
}

/// Outcome of applying one batch of quotes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Symbols whose row was updated.
    pub updated: Vec<String>,
    /// Symbols the service returned that have no stored row.
    pub unmatched: Vec<String>,
    /// Row count after the batch.
    pub stored_count: usize,
}

/// Durable mapping from symbol to last known price and change.
#[derive(Debug, Clone)]
pub struct SymbolStore {
    db: Database,
}

impl SymbolStore {
    /// Store backed by `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Underlying session provider.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Insert a row for `symbol` with empty price and change.
    pub fn insert(&self, symbol: &str) -> Result<()> {
        self.db.with_session(|s| {
            self.db.echo(INSERT_STOCK);
            s.execute(INSERT_STOCK, params![symbol])?;
            Ok(())
        })
    }

    /// Overwrite the price (and the change, when given) of `symbol`.
    ///
    /// Fails with [`StreamError::UnmatchedQuote`] when no row exists.
    pub fn update_quote(&self, symbol: &str, price: Option<&str>, change: Option<&str>) -> Result<()> {
        self.db
            .with_session(|s| update_row(&self.db, s, symbol, price, change))
    }

    /// Delete the row of `symbol`. Returns whether a row existed.
    pub fn delete(&self, symbol: &str) -> Result<bool> {
        self.db.with_session(|s| {
            self.db.echo(DELETE_STOCK);
            Ok(s.execute(DELETE_STOCK, params![symbol])? > 0)
        })
    }

    /// Row of `symbol`, exact match against the stored uppercase form.
    pub fn find(&self, symbol: &str) -> Result<Option<StockRow>> {
        self.db.with_session(|s| {
            self.db.echo(FIND_STOCK);
            let row = s
                .query_row(FIND_STOCK, params![symbol], read_row)
                .optional()?;
            Ok(row)
        })
    }

    /// Every row, in insertion order.
    pub fn list_all(&self) -> Result<Vec<StockRow>> {
        self.db.with_session(|s| {
            self.db.echo(LIST_STOCKS);
            let mut stmt = s.prepare(LIST_STOCKS)?;
            let rows = stmt.query_map([], read_row)?;
            let mut stocks = Vec::new();
            for row in rows {
                stocks.push(row?);
            }
            Ok(stocks)
        })
    }

    /// Number of rows.
    pub fn count(&self) -> Result<usize> {
        self.db.with_session(|s| count_rows(&self.db, s))
    }

    /// Apply a poll batch in one session.
    ///
    /// Records for unknown symbols are collected in the report instead of
    /// aborting the batch; any other failure rolls the whole batch back.
    pub fn apply_quotes(&self, records: &[QuoteRecord]) -> Result<ApplyReport> {
        self.db.with_session(|s| {
            let mut report = ApplyReport::default();
            for record in records {
                let change = record.change();
                match update_row(
                    &self.db,
                    s,
                    &record.symbol,
                    record.last_trade_price.as_deref(),
                    change.as_deref(),
                ) {
                    Ok(()) => report.updated.push(record.symbol.clone()),
                    Err(StreamError::UnmatchedQuote(symbol)) => report.unmatched.push(symbol),
                    Err(e) => return Err(e),
                }
            }
            report.stored_count = count_rows(&self.db, s)?;
            Ok(report)
        })
    }
}

fn update_row(
    db: &Database,
    session: &Transaction<'_>,
    symbol: &str,
    price: Option<&str>,
    change: Option<&str>,
) -> Result<()> {
    db.echo(UPDATE_QUOTE);
    let changed = session.execute(UPDATE_QUOTE, params![symbol, price, change])?;
    if changed == 0 {
        return Err(StreamError::UnmatchedQuote(symbol.to_string()));
    }
    Ok(())
}

fn count_rows(db: &Database, session: &Transaction<'_>) -> Result<usize> {
    db.echo(COUNT_STOCKS);
    let count: i64 = session.query_row(COUNT_STOCKS, [], |row| row.get(0))?;
    Ok(count as usize)
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StockRow> {
    Ok(StockRow {
        id: row.get(0)?,
        symbol: row.get(1)?,
        last_trade_price: row.get(2)?,
        change: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, SymbolStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db = Database::new(dir.path().join("db").join("stocks.db"), false);
        db.init_schema().expect("schema");
        (dir, SymbolStore::new(db))
    }

    #[test]
    fn init_schema_creates_parent_directory_and_is_repeatable() {
        let (dir, store) = open_store();
        assert!(dir.path().join("db").is_dir());
        store.database().init_schema().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn failed_session_rolls_back() {
        let (_dir, store) = open_store();
        let result: Result<()> = store.database().with_session(|s| {
            s.execute(INSERT_STOCK, params!["AAPL"])?;
            Err(StreamError::Config("abort".into()))
        });
        assert!(result.is_err());
        assert!(store.find("AAPL").unwrap().is_none());
    }

    #[test]
    fn duplicate_insert_is_a_typed_error() {
        let (_dir, store) = open_store();
        store.insert("AAPL").unwrap();
        assert!(matches!(store.insert("AAPL"), Err(StreamError::Sqlite(_))));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn update_keeps_change_when_quote_has_none() {
        let (_dir, store) = open_store();
        store.insert("AAPL").unwrap();
        store.update_quote("AAPL", Some("100"), Some("+1")).unwrap();
        store.update_quote("AAPL", Some("101"), None).unwrap();
        let row = store.find("AAPL").unwrap().unwrap();
        assert_eq!(row.last_trade_price.as_deref(), Some("101"));
        assert_eq!(row.change.as_deref(), Some("+1"));
    }

    #[test]
    fn update_unknown_symbol_is_unmatched() {
        let (_dir, store) = open_store();
        assert!(matches!(
            store.update_quote("NOPE", Some("1"), None),
            Err(StreamError::UnmatchedQuote(s)) if s == "NOPE"
        ));
    }
}
