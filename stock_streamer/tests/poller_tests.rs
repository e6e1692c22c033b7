use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stock_streamer::model::quote::{parse_quote_response, QuoteRecord};
use stock_streamer::model::stock::StockRow;
use stock_streamer::poller::{CycleOutcome, Poller, PollerState};
use stock_streamer::quote_client::{HttpQuoteClient, QuoteSource};
use stock_streamer::shutdown::ShutdownToken;
use stock_streamer::store::{Database, SymbolStore};
use stock_streamer::watchlist::Streamer;
use stock_streamer::{Result, StreamError};
use tempfile::TempDir;

/// Scripted quote source recording every request it receives.
#[derive(Clone, Default)]
struct FakeSource {
    responses: Arc<Mutex<VecDeque<Result<Vec<QuoteRecord>>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    cancel_on_fetch: Option<ShutdownToken>,
}

impl FakeSource {
    fn with_responses(responses: Vec<Result<Vec<QuoteRecord>>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl QuoteSource for FakeSource {
    fn fetch(&self, symbols_csv: &str) -> Result<Vec<QuoteRecord>> {
        self.calls.lock().unwrap().push(symbols_csv.to_string());
        if let Some(token) = &self.cancel_on_fetch {
            token.cancel();
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn open_streamer(symbols: &[&str]) -> (TempDir, Arc<Streamer>) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db = Database::new(dir.path().join("stocks.db"), false);
    db.init_schema().expect("schema should be created");
    let streamer = Streamer::open(SymbolStore::new(db)).expect("load should succeed");
    for symbol in symbols {
        streamer.add(symbol).unwrap();
    }
    (dir, Arc::new(streamer))
}

fn poller<Q: QuoteSource>(streamer: &Arc<Streamer>, source: Q) -> Poller<Q> {
    Poller::new(
        Arc::clone(streamer),
        source,
        Duration::from_millis(10),
        ShutdownToken::new(),
    )
}

fn rows(streamer: &Streamer) -> Vec<StockRow> {
    streamer.store().list_all().unwrap()
}

fn transport_error() -> StreamError {
    StreamError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
}

#[test]
/// An empty watch-list makes no request and touches nothing.
fn empty_watchlist_is_idle() {
    let (_dir, streamer) = open_streamer(&[]);
    let source = FakeSource::default();
    let poller = poller(&streamer, source.clone());

    assert!(matches!(poller.run_cycle(), CycleOutcome::Idle));
    assert_eq!(poller.state(), PollerState::Idle);
    assert!(source.calls().is_empty());
    assert_eq!(streamer.store().count().unwrap(), 0);
}

#[test]
/// {AAPL: 100} + quote {AAPL: 105} -> {AAPL: 105}.
fn quote_overwrites_price() {
    let (_dir, streamer) = open_streamer(&["AAPL"]);
    streamer
        .store()
        .update_quote("AAPL", Some("100"), None)
        .unwrap();
    let source = FakeSource::with_responses(vec![Ok(vec![QuoteRecord::new("AAPL", "105")])]);
    let poller = poller(&streamer, source);

    match poller.run_cycle() {
        CycleOutcome::Updated(report) => {
            assert_eq!(report.requested, 1);
            assert_eq!(report.applied.updated, vec!["AAPL".to_string()]);
            assert!(report.applied.unmatched.is_empty());
            assert!(!report.count_mismatch());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    let row = streamer.store().find("AAPL").unwrap().unwrap();
    assert_eq!(row.last_trade_price.as_deref(), Some("105"));
    assert_eq!(poller.state(), PollerState::Updating);
}

#[test]
/// The request carries the serialized list as it was at the start of the cycle.
fn request_uses_serialized_watchlist() {
    let (_dir, streamer) = open_streamer(&["aapl", "msft"]);
    let source = FakeSource::default();
    let poller = poller(&streamer, source.clone());

    poller.run_cycle();
    streamer.add("tsla").unwrap();
    poller.run_cycle();

    assert_eq!(
        source.calls(),
        vec![
            "AAPL\",\"MSFT".to_string(),
            "AAPL\",\"MSFT\",\"TSLA".to_string()
        ]
    );
}

#[test]
/// Single-object and one-element-list responses write the same rows.
fn single_object_and_list_responses_match() {
    let single = r#"{"query":{"results":{"quote":{"Symbol":"AAPL","LastTradePriceOnly":"105.25","Change":"+0.75"}}}}"#;
    let list = r#"{"query":{"results":{"quote":[{"Symbol":"AAPL","LastTradePriceOnly":"105.25","Change":"+0.75"}]}}}"#;

    let mut results = Vec::new();
    for body in [single, list] {
        let (_dir, streamer) = open_streamer(&["AAPL"]);
        let records = parse_quote_response(body).unwrap();
        let poller = poller(&streamer, FakeSource::with_responses(vec![Ok(records)]));
        assert!(matches!(poller.run_cycle(), CycleOutcome::Updated(_)));
        results.push(rows(&streamer));
    }

    assert_eq!(results[0], results[1]);
    assert_eq!(results[0][0].change.as_deref(), Some("+0.75"));
}

#[test]
/// A failed request leaves the store alone and the next cycle still runs.
fn transport_failure_skips_only_that_cycle() {
    let (_dir, streamer) = open_streamer(&["AAPL"]);
    let source = FakeSource::with_responses(vec![
        Err(transport_error()),
        Ok(vec![QuoteRecord::new("AAPL", "99.5")]),
    ]);
    let poller = poller(&streamer, source.clone());
    let before = rows(&streamer);

    assert!(matches!(poller.run_cycle(), CycleOutcome::Skipped(_)));
    assert_eq!(rows(&streamer), before);

    assert!(matches!(poller.run_cycle(), CycleOutcome::Updated(_)));
    let row = streamer.store().find("AAPL").unwrap().unwrap();
    assert_eq!(row.last_trade_price.as_deref(), Some("99.5"));
    assert_eq!(source.calls().len(), 2);
}

#[test]
/// A real connection failure is reported as a skipped cycle.
fn unreachable_service_skips_cycle() {
    let (_dir, streamer) = open_streamer(&["AAPL"]);
    let client =
        HttpQuoteClient::new("http://127.0.0.1:9/q?s={symbols}", Duration::from_secs(2)).unwrap();
    let poller = poller(&streamer, client);
    let before = rows(&streamer);

    match poller.run_cycle() {
        CycleOutcome::Skipped(e) => assert!(e.is_transient()),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(rows(&streamer), before);
}

#[test]
/// Malformed responses are skipped like transport failures.
fn malformed_response_skips_cycle() {
    let (_dir, streamer) = open_streamer(&["AAPL"]);
    let bad = parse_quote_response(r#"{"unexpected":true}"#).unwrap_err();
    let poller = poller(&streamer, FakeSource::with_responses(vec![Err(bad)]));

    match poller.run_cycle() {
        CycleOutcome::Skipped(StreamError::MalformedResponse(_)) => {}
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(
        streamer.store().find("AAPL").unwrap().unwrap().last_trade_price,
        None
    );
}

#[test]
/// Quotes for unknown symbols are reported; the rest of the batch is stored.
fn unmatched_quote_is_reported() {
    let (_dir, streamer) = open_streamer(&["AAPL"]);
    let source = FakeSource::with_responses(vec![Ok(vec![
        QuoteRecord::new("AAPL", "101"),
        QuoteRecord::new("ZZZZ", "1"),
    ])]);
    let poller = poller(&streamer, source);

    match poller.run_cycle() {
        CycleOutcome::Updated(report) => {
            assert_eq!(report.applied.updated, vec!["AAPL".to_string()]);
            assert_eq!(report.applied.unmatched, vec!["ZZZZ".to_string()]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(streamer.store().find("ZZZZ").unwrap().is_none());
    assert_eq!(streamer.store().count().unwrap(), 1);
}

#[test]
/// More stored rows than tracked symbols is flagged but not fatal.
fn count_mismatch_is_flagged() {
    let (_dir, streamer) = open_streamer(&["AAPL"]);
    streamer.store().insert("GOOG").unwrap();
    let source = FakeSource::with_responses(vec![Ok(vec![QuoteRecord::new("AAPL", "101")])]);
    let poller = poller(&streamer, source);

    match poller.run_cycle() {
        CycleOutcome::Updated(report) => {
            assert!(report.count_mismatch());
            assert_eq!(report.applied.stored_count, 2);
            assert_eq!(report.requested, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
/// A cancelled token stops the loop before any cycle.
fn run_returns_when_already_cancelled() {
    let (_dir, streamer) = open_streamer(&["AAPL"]);
    let source = FakeSource::default();
    let token = ShutdownToken::new();
    token.cancel();
    let poller = Poller::new(
        Arc::clone(&streamer),
        source.clone(),
        Duration::from_millis(10),
        token,
    );

    poller.run();
    assert!(source.calls().is_empty());
    assert_eq!(poller.state(), PollerState::Stopped);
}

#[test]
/// Cancelling mid-cycle lets the cycle finish and stops at the next boundary.
fn cancel_is_observed_at_cycle_boundary() {
    let (_dir, streamer) = open_streamer(&["AAPL"]);
    let token = ShutdownToken::new();
    let source = FakeSource {
        cancel_on_fetch: Some(token.clone()),
        ..FakeSource::with_responses(vec![Ok(vec![QuoteRecord::new("AAPL", "120")])])
    };
    let poller = Poller::new(
        Arc::clone(&streamer),
        source.clone(),
        Duration::from_millis(10),
        token,
    );

    poller.run();
    assert_eq!(source.calls().len(), 1);
    assert_eq!(
        streamer.store().find("AAPL").unwrap().unwrap().last_trade_price.as_deref(),
        Some("120")
    );
    assert_eq!(poller.state(), PollerState::Stopped);
}
