//! Process-wide configuration.
//!
//! Values come from an optional TOML file, then command-line overrides. A
//! missing file means defaults; a present but invalid file is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use stock_common::endpoint;

use crate::args::Args;
use crate::error::StreamError;
use crate::result::Result;

/// Default configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Complete configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store location and verbosity.
    pub database: DatabaseConfig,
    /// Poll cycle settings.
    pub poller: PollerConfig,
    /// Table refresher settings.
    pub display: DisplayConfig,
    /// Shutdown settings.
    pub shutdown: ShutdownConfig,
    /// Interactive console instead of the table refresher.
    #[serde(skip)]
    pub debug: bool,
}

/// `[database]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file.
    pub path: PathBuf,
    /// Log every SQL statement.
    pub echo: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("db/sample_db.db"),
            echo: false,
        }
    }
}

/// `[poller]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Seconds between cycles.
    pub interval_secs: u64,
    /// Per-request timeout of the quote service call.
    pub request_timeout_secs: u64,
    /// Endpoint template containing `{symbols}`.
    pub quote_url: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            request_timeout_secs: 10,
            quote_url: endpoint::DEFAULT_QUOTE_URL.to_string(),
        }
    }
}

impl PollerConfig {
    /// Interval as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `[display]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Milliseconds between store reads.
    pub refresh_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { refresh_ms: 100 }
    }
}

impl DisplayConfig {
    /// Refresh period as a `Duration`.
    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }
}

/// `[shutdown]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long to wait for workers once shutdown starts.
    pub join_timeout_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            join_timeout_secs: 5,
        }
    }
}

impl ShutdownConfig {
    /// Grace period as a `Duration`.
    pub fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs)
    }
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read `path`; a missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// File named by `args` (or the default file), then `args` overrides, then validation.
    pub fn load(args: &Args) -> Result<Self> {
        let path = args
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        if args.config.is_some() && !path.exists() {
            return Err(StreamError::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        let mut config = Self::from_file(&path)?;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Overlay command-line values.
    pub fn apply_args(&mut self, args: &Args) {
        self.debug = args.debug;
        if let Some(interval) = args.interval {
            self.poller.interval_secs = interval;
        }
        if let Some(path) = &args.database {
            self.database.path = path.clone();
        }
        if args.echo {
            self.database.echo = true;
        }
    }

    /// Reject values the streamer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poller.interval_secs == 0 {
            return Err(StreamError::Config("poller.interval_secs must be >= 1".into()));
        }
        if self.poller.request_timeout_secs == 0 {
            return Err(StreamError::Config(
                "poller.request_timeout_secs must be >= 1".into(),
            ));
        }
        if !endpoint::is_valid_template(&self.poller.quote_url) {
            return Err(StreamError::Config(format!(
                "poller.quote_url must contain {}",
                endpoint::SYMBOLS_PLACEHOLDER
            )));
        }
        if self.display.refresh_ms < 10 {
            return Err(StreamError::Config("display.refresh_ms must be >= 10".into()));
        }
        Ok(())
    }
}
