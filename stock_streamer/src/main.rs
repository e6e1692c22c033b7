//! Stock streamer.
//!
//! This binary tracks a watch-list of ticker symbols and keeps their last trade
//! price in a local SQLite database. It wires together:
//!
//! - `Streamer`: loads the watch-list from the database at start and applies
//!   `--symbols-file`, `--add` and `--remove` requests.
//! - `Poller`: background thread fetching quotes for the whole watch-list every
//!   interval and writing them to the database.
//! - console (with `--debug`): reads `ADD`/`REMOVE`/`HELP`/`QUITNOW` from stdin;
//!   otherwise the table view prints the stored quotes whenever they change.
//!
//! Shutdown: `QUITNOW` or Ctrl+C cancels the shared token; workers stop at their
//! next loop boundary and the process waits for them at most
//! `shutdown.join_timeout_secs` before exiting.
//!
//! Usage example (CLI):
//! ```bash
//! stock_streamer --debug --interval 10 --add aapl --add msft
//! ```
use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};
use stock_common::symbol::SymbolParser;
use stock_common::Symbol;
use stock_streamer::args::Args;
use stock_streamer::config::Config;
use stock_streamer::console::run_console;
use stock_streamer::display::Display;
use stock_streamer::poller::Poller;
use stock_streamer::quote_client::HttpQuoteClient;
use stock_streamer::shutdown::{spawn_worker, wait_for_workers, ShutdownToken};
use stock_streamer::store::{Database, SymbolStore};
use stock_streamer::watchlist::Streamer;
use stock_streamer::{Result, StreamError};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger();
    let config = Config::load(&args)?;

    let db = Database::new(&config.database.path, config.database.echo);
    db.init_schema()?;
    let streamer = Arc::new(Streamer::open(SymbolStore::new(db))?);
    apply_startup_symbols(&streamer, &args)?;

    let token = ShutdownToken::new();
    {
        let token = token.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down...");
            token.cancel();
        })
        .map_err(|e| StreamError::Io(io::Error::other(e)))?;
    }

    let (done_tx, done_rx) = crossbeam_channel::unbounded::<String>();
    let mut workers = Vec::new();

    let client = HttpQuoteClient::new(&config.poller.quote_url, config.poller.request_timeout())?;
    let poller = Poller::new(
        Arc::clone(&streamer),
        client,
        config.poller.interval(),
        token.clone(),
    );
    spawn_worker("poller", done_tx.clone(), move || poller.run())?;
    workers.push("poller".to_string());

    if config.debug {
        let streamer = Arc::clone(&streamer);
        let token = token.clone();
        spawn_worker("console", done_tx.clone(), move || {
            if let Err(e) = run_console(io::stdin().lock(), io::stdout(), &streamer, &token) {
                error!("Console stopped: {}", e);
            }
        })?;
        workers.push("console".to_string());
    } else {
        let mut display = Display::new(streamer.store().clone(), io::stdout());
        let token = token.clone();
        let every = config.display.refresh();
        spawn_worker("display", done_tx.clone(), move || display.run(every, &token))?;
        workers.push("display".to_string());
    }
    drop(done_tx);

    info!("Streamer is running. Press Ctrl+C to exit.");
    let abandoned = wait_for_workers(&done_rx, &workers, &token, config.shutdown.join_timeout());
    if abandoned.is_empty() {
        info!("All workers stopped");
    }
    Ok(())
}

/// Apply `--symbols-file`, `--add` and `--remove`, in that order.
///
/// A malformed symbols file is fatal; a bad `--add`/`--remove` value is logged
/// and skipped like any other rejected symbol.
fn apply_startup_symbols(streamer: &Streamer, args: &Args) -> Result<()> {
    if let Some(path) = &args.symbols_file {
        let file = File::open(path)?;
        let symbols = Symbol::parse_from_file(BufReader::new(file))?;
        info!("Symbols from {}: {:?}", path.display(), symbols);
        for symbol in &symbols {
            streamer.add(symbol.as_str())?;
        }
    }
    for symbol in &args.add {
        match streamer.add(symbol) {
            Ok(_) | Err(StreamError::InvalidSymbol(_)) => {}
            Err(e) => return Err(e),
        }
    }
    for symbol in &args.remove {
        match streamer.remove(symbol) {
            Ok(outcome) => info!("--remove {}: {:?}", symbol, outcome),
            Err(StreamError::InvalidSymbol(e)) => warn!("--remove {}: {}", symbol, e),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
