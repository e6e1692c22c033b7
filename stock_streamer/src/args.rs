//! Command-line arguments for the stock streamer.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Polls a quote service for a watch-list of ticker symbols", long_about = None)]
pub struct Args {
    /// TOML configuration file. Defaults to `config/default.toml` when present.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Run the interactive console (ADD/REMOVE/HELP/QUITNOW) instead of the table view.
    #[clap(long)]
    pub debug: bool,

    /// Seconds between poll cycles.
    #[clap(long)]
    pub interval: Option<u64>,

    /// SQLite database file.
    #[clap(long)]
    pub database: Option<PathBuf>,

    /// Log every SQL statement.
    #[clap(long)]
    pub echo: bool,

    /// Symbol to track; may be repeated.
    #[clap(long = "add", value_name = "SYMBOL")]
    pub add: Vec<String>,

    /// Symbol to stop tracking; may be repeated.
    #[clap(long = "remove", value_name = "SYMBOL")]
    pub remove: Vec<String>,

    /// File with one symbol per line to track.
    #[clap(long)]
    pub symbols_file: Option<PathBuf>,
}
