//! Watch-list synchronizer.
//!
//! The [`Streamer`] owns the in-memory watch-list and keeps it, its serialized
//! form and the [`SymbolStore`] consistent through `add` and `remove`.
//!
//! The membership rules are asymmetric:
//! - `add` acts on whichever side is missing the symbol (local list, store or both);
//! - `remove` acts only when the symbol is present on **both** sides, otherwise it
//!   reports which side lacks it and changes nothing.
//!
//! The local list and the store are updated one after the other, not in a
//! single transaction; a failed store write leaves the sides out of step and
//! the next `add`/`remove` for the symbol re-checks both sides again.

use std::sync::Mutex;

use log::{info, warn};
use stock_common::symbol::join_symbols;
use stock_common::Symbol;

use crate::error::StreamError;
use crate::model::stock::StockRow;
use crate::result::Result;
use crate::store::SymbolStore;

/// Tracked symbols plus their serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchList {
    symbols: Vec<String>,
    serialized: String,
}

impl WatchList {
    /// Tracked symbols in insertion order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Symbols joined as the quote request parameter.
    pub fn serialized(&self) -> &str {
        &self.serialized
    }

    /// Number of tracked symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    fn push(&mut self, symbol: String) {
        self.symbols.push(symbol);
        self.serialized = join_symbols(&self.symbols);
    }

    fn remove(&mut self, symbol: &str) {
        self.symbols.retain(|s| s != symbol);
        self.serialized = join_symbols(&self.symbols);
    }
}

/// What `add` changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    /// Symbol was appended to the local watch-list.
    pub added_local: bool,
    /// A new row was inserted into the store.
    pub added_database: bool,
}

impl AddOutcome {
    /// Whether anything changed.
    pub fn changed(&self) -> bool {
        self.added_local || self.added_database
    }
}

/// What `remove` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Removed from the local watch-list and the store.
    Removed,
    /// Not in the local watch-list; nothing changed.
    NotInLocal,
    /// In the local watch-list but not in the store; nothing changed.
    NotInDatabase,
}

/// Keeps the watch-list and the symbol store in step.
#[derive(Debug)]
pub struct Streamer {
    watchlist: Mutex<WatchList>,
    store: SymbolStore,
}

impl Streamer {
    /// Synchronizer over `store`, with an empty watch-list. Call [`Streamer::load`]
    /// to pick up stored symbols.
    pub fn new(store: SymbolStore) -> Self {
        Self {
            watchlist: Mutex::new(WatchList::default()),
            store,
        }
    }

    /// Build a synchronizer and load the stored symbols into its watch-list.
    pub fn open(store: SymbolStore) -> Result<Self> {
        let streamer = Self::new(store);
        streamer.load()?;
        Ok(streamer)
    }

    /// The symbol store this synchronizer writes to.
    pub fn store(&self) -> &SymbolStore {
        &self.store
    }

    /// Add every stored symbol to the watch-list.
    ///
    /// Store errors propagate. A stored symbol that no longer validates is
    /// skipped (it is logged by `add`) so one bad row cannot block start-up.
    pub fn load(&self) -> Result<()> {
        let stored = self.store.list_all()?;
        for stock in &stored {
            match self.add(&stock.symbol) {
                Ok(_) | Err(StreamError::InvalidSymbol(_)) => {}
                Err(e) => return Err(e),
            }
        }
        info!("Loaded {} symbol(s) from {}", stored.len(), self.store.database().path().display());
        Ok(())
    }

    /// Track `symbol`, creating whichever side is missing.
    ///
    /// Invalid symbols are rejected with [`StreamError::InvalidSymbol`] before
    /// anything is touched.
    pub fn add(&self, symbol: &str) -> Result<AddOutcome> {
        let symbol = validate(symbol)?;
        let in_local = self.find_local(&symbol)?.is_some();
        let in_database = self.find_database(&symbol)?.is_some();

        if !in_local {
            self.watchlist.lock()?.push(symbol.clone());
        }
        if !in_database {
            self.store.insert(&symbol)?;
        }

        let outcome = AddOutcome {
            added_local: !in_local,
            added_database: !in_database,
        };
        if outcome.changed() {
            info!(
                "Added {} (local: {}, database: {})",
                symbol, outcome.added_local, outcome.added_database
            );
        }
        Ok(outcome)
    }

    /// Stop tracking `symbol`. Only acts when it is both local and stored.
    pub fn remove(&self, symbol: &str) -> Result<RemoveOutcome> {
        let symbol = validate(symbol)?;
        let in_local = self.find_local(&symbol)?.is_some();
        let in_database = self.find_database(&symbol)?.is_some();

        if in_local && in_database {
            self.watchlist.lock()?.remove(&symbol);
            self.store.delete(&symbol)?;
            info!("Removed {}", symbol);
            Ok(RemoveOutcome::Removed)
        } else if !in_local {
            warn!("Symbol {} is not in the local stocks list.", symbol);
            Ok(RemoveOutcome::NotInLocal)
        } else {
            warn!("Symbol {} is not in the database.", symbol);
            Ok(RemoveOutcome::NotInDatabase)
        }
    }

    /// The tracked symbol equal to `symbol`, if any.
    pub fn find_local(&self, symbol: &str) -> Result<Option<String>> {
        let watchlist = self.watchlist.lock()?;
        Ok(watchlist.contains(symbol).then(|| symbol.to_string()))
    }

    /// The stored row of `symbol`, if any.
    pub fn find_database(&self, symbol: &str) -> Result<Option<StockRow>> {
        self.store.find(symbol)
    }

    /// Copy of the watch-list taken under a single lock.
    pub fn snapshot(&self) -> Result<WatchList> {
        Ok(self.watchlist.lock()?.clone())
    }
}

fn validate(raw: &str) -> Result<String> {
    match Symbol::parse(raw) {
        Ok(symbol) => Ok(symbol.into_inner()),
        Err(e) => {
            warn!("Rejected symbol {:?}: {}", raw, e);
            Err(StreamError::InvalidSymbol(e))
        }
    }
}
