//! Background quote poller.
//!
//! Every interval the poller snapshots the watch-list, asks its
//! [`QuoteSource`] for quotes on the whole list in one request and writes the
//! results through the symbol store in a single session.
//!
//! Failure policy:
//! - transport and response-shape errors are logged and the cycle is skipped;
//!   the next cycle runs on the normal schedule, with no retry or backoff;
//! - quotes for symbols without a stored row are reported as warnings;
//! - a stored row count that differs from the watch-list size is a warning.
//!
//! The loop observes the [`ShutdownToken`] once per cycle, after the sleep.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::error::StreamError;
use crate::quote_client::QuoteSource;
use crate::shutdown::ShutdownToken;
use crate::store::ApplyReport;
use crate::watchlist::Streamer;

/// Where the poller is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Watch-list was empty on the last check.
    Idle,
    /// Waiting on the quote service.
    Fetching,
    /// Writing quotes to the store.
    Updating,
    /// Between cycles.
    Sleeping,
    /// Loop has exited.
    Stopped,
}

/// Result of a cycle that wrote quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Watch-list size when the cycle started.
    pub requested: usize,
    /// What the store did with the batch.
    pub applied: ApplyReport,
}

impl CycleReport {
    /// Stored row count differs from the requested watch-list size.
    pub fn count_mismatch(&self) -> bool {
        self.applied.stored_count != self.requested
    }
}

/// Result of one poll cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Watch-list empty: no request, no store access.
    Idle,
    /// Cycle abandoned; the store is unchanged.
    Skipped(StreamError),
    /// Quotes were written.
    Updated(CycleReport),
}

/// Fixed-interval quote poller.
pub struct Poller<Q: QuoteSource> {
    streamer: Arc<Streamer>,
    source: Q,
    interval: Duration,
    token: ShutdownToken,
    state: Mutex<PollerState>,
}

impl<Q: QuoteSource> Poller<Q> {
    /// Poller for `streamer`'s watch-list, fetching from `source` every `interval`.
    pub fn new(streamer: Arc<Streamer>, source: Q, interval: Duration, token: ShutdownToken) -> Self {
        Self {
            streamer,
            source,
            interval,
            token,
            state: Mutex::new(PollerState::Idle),
        }
    }

    /// Current state.
    pub fn state(&self) -> PollerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: PollerState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != next {
            debug!("Poller {:?} -> {:?}", *state, next);
            *state = next;
        }
    }

    /// Loop cycle → sleep until the token is cancelled.
    pub fn run(&self) {
        info!("Poller started, interval {:?}", self.interval);
        while !self.token.is_cancelled() {
            self.run_cycle();
            self.set_state(PollerState::Sleeping);
            thread::sleep(self.interval);
        }
        self.set_state(PollerState::Stopped);
        info!("Poller stopped");
    }

    /// Perform one fetch-and-update pass.
    pub fn run_cycle(&self) -> CycleOutcome {
        let watchlist = match self.streamer.snapshot() {
            Ok(watchlist) => watchlist,
            Err(e) => {
                error!("Could not read the watch-list: {}", e);
                return CycleOutcome::Skipped(e);
            }
        };
        if watchlist.is_empty() {
            self.set_state(PollerState::Idle);
            return CycleOutcome::Idle;
        }

        self.set_state(PollerState::Fetching);
        let records = match self.source.fetch(watchlist.serialized()) {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "Could not retrieve quotes: {}. Trying again in {} seconds.",
                    e,
                    self.interval.as_secs()
                );
                return CycleOutcome::Skipped(e);
            }
        };

        self.set_state(PollerState::Updating);
        let applied = match self.streamer.store().apply_quotes(&records) {
            Ok(applied) => applied,
            Err(e) => {
                error!("Could not store quotes, batch rolled back: {}", e);
                return CycleOutcome::Skipped(e);
            }
        };

        for record in records.iter().filter(|r| applied.updated.contains(&r.symbol)) {
            info!(
                "Symbol: {} Price: {}",
                record.symbol,
                record.last_trade_price.as_deref().unwrap_or("-")
            );
        }
        for symbol in &applied.unmatched {
            warn!("{}", StreamError::UnmatchedQuote(symbol.clone()));
        }

        let report = CycleReport {
            requested: watchlist.len(),
            applied,
        };
        if report.count_mismatch() {
            warn!(
                "Warning: {} stock(s) in the database but {} being updated. Some data may not be refreshing and will be inaccurate.",
                report.applied.stored_count, report.requested
            );
        }
        CycleOutcome::Updated(report)
    }
}
