use std::io::Cursor;

use stock_streamer::console::run_console;
use stock_streamer::shutdown::ShutdownToken;
use stock_streamer::store::{Database, SymbolStore};
use stock_streamer::watchlist::Streamer;
use tempfile::TempDir;

fn open_streamer() -> (TempDir, Streamer) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db = Database::new(dir.path().join("stocks.db"), false);
    db.init_schema().expect("schema should be created");
    let streamer = Streamer::open(SymbolStore::new(db)).expect("load should succeed");
    (dir, streamer)
}

fn run(streamer: &Streamer, token: &ShutdownToken, input: &str) -> String {
    let mut output = Vec::new();
    run_console(Cursor::new(input), &mut output, streamer, token).expect("console should not fail");
    String::from_utf8(output).unwrap()
}

#[test]
/// Commands are dispatched in order and QUITNOW ends the loop and cancels the token.
fn commands_dispatch_until_quitnow() {
    let (_dir, streamer) = open_streamer();
    let token = ShutdownToken::new();
    let output = run(
        &streamer,
        &token,
        "add aapl\nADD msft\nhelp\nremove aapl\nquitnow\nadd tsla\n",
    );

    assert!(token.is_cancelled());
    assert!(output.contains("Added AAPL."));
    assert!(output.contains("Removed AAPL."));
    assert!(output.contains("A list of commands."));
    assert_eq!(streamer.snapshot().unwrap().symbols(), ["MSFT".to_string()]);
    assert!(streamer.find_database("TSLA").unwrap().is_none());
}

#[test]
/// End of input leaves the token untouched.
fn eof_does_not_cancel() {
    let (_dir, streamer) = open_streamer();
    let token = ShutdownToken::new();
    run(&streamer, &token, "add tsla\n");

    assert!(!token.is_cancelled());
    assert!(streamer.find_local("TSLA").unwrap().is_some());
}

#[test]
/// Bad lines and rejected symbols are reported and the loop keeps going.
fn bad_input_is_reported_and_ignored() {
    let (_dir, streamer) = open_streamer();
    let token = ShutdownToken::new();
    let output = run(
        &streamer,
        &token,
        "\nadd\nfrobnicate x\nadd $$$\nremove goog\nadd nvda\n",
    );

    assert!(output.contains("Invalid symbol"));
    assert!(output.contains("Symbol GOOG is not in the local stocks list."));
    assert!(output.contains("Added NVDA."));
    assert_eq!(streamer.snapshot().unwrap().symbols(), ["NVDA".to_string()]);
}

#[test]
/// Adding a tracked symbol again says so instead of claiming a change.
fn repeated_add_is_reported() {
    let (_dir, streamer) = open_streamer();
    let token = ShutdownToken::new();
    let output = run(&streamer, &token, "add aapl\nadd AAPL\n");
    assert!(output.contains("AAPL is already tracked."));
}

#[test]
/// A symbol whose row went missing is reported as not in the database.
fn remove_without_row_is_reported() {
    let (_dir, streamer) = open_streamer();
    streamer.add("IBM").unwrap();
    streamer.store().delete("IBM").unwrap();
    let token = ShutdownToken::new();
    let output = run(&streamer, &token, "remove ibm\n");
    assert!(output.contains("Symbol IBM is not in the database."));
}
