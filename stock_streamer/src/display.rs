//! Headless stock table.
//!
//! Reads the symbol store on a fixed interval and prints the table whenever
//! it differs from the last one printed.

use std::io::Write;
use std::thread;
use std::time::Duration;

use chrono::Local;
use log::{info, warn};
use tabled::{Table, Tabled};

use crate::model::stock::StockRow;
use crate::result::Result;
use crate::shutdown::ShutdownToken;
use crate::store::SymbolStore;

#[derive(Tabled)]
struct StockLine {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Last Price")]
    last_trade_price: String,
    #[tabled(rename = "Change")]
    change: String,
}

impl From<&StockRow> for StockLine {
    fn from(row: &StockRow) -> Self {
        Self {
            symbol: row.symbol.clone(),
            last_trade_price: row.last_trade_price.clone().unwrap_or_default(),
            change: row.change.clone().unwrap_or_default(),
        }
    }
}

/// Render rows as a `Symbol | Last Price | Change` table.
pub fn render_table(rows: &[StockRow]) -> String {
    Table::new(rows.iter().map(StockLine::from)).to_string()
}

/// Table refresher writing to `output`.
pub struct Display<W: Write> {
    store: SymbolStore,
    output: W,
    last_rendered: Option<String>,
}

impl<W: Write> Display<W> {
    /// Refresher over `store`.
    pub fn new(store: SymbolStore, output: W) -> Self {
        Self {
            store,
            output,
            last_rendered: None,
        }
    }

    /// Read the store once; print when the table changed. Returns whether it printed.
    pub fn refresh(&mut self) -> Result<bool> {
        let rows = self.store.list_all()?;
        let table = render_table(&rows);
        if self.last_rendered.as_deref() == Some(table.as_str()) {
            return Ok(false);
        }
        writeln!(self.output, "\n{}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(self.output, "{}", table)?;
        self.output.flush()?;
        self.last_rendered = Some(table);
        Ok(true)
    }

    /// Refresh every `every` until `token` is cancelled.
    pub fn run(&mut self, every: Duration, token: &ShutdownToken) {
        info!("Display refresh every {:?}", every);
        while !token.is_cancelled() {
            if let Err(e) = self.refresh() {
                warn!("Display refresh failed: {}", e);
            }
            thread::sleep(every);
        }
    }

    /// Consume the refresher and return its output.
    pub fn into_output(self) -> W {
        self.output
    }
}
