//! Interactive control loop (debug mode only).
//!
//! Reads one command per line and forwards it to the [`Streamer`]. Diagnostics
//! go to `output`; the loop never stops on a bad command, only on `QUITNOW`
//! (which cancels the shutdown token) or end of input.

use std::io::{BufRead, Write};

use log::{debug, info};
use stock_common::command::HELP_TEXT;
use stock_common::Command;

use crate::result::Result;
use crate::shutdown::ShutdownToken;
use crate::watchlist::{RemoveOutcome, Streamer};

/// Run the console until `QUITNOW` or end of input.
pub fn run_console<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    streamer: &Streamer,
    token: &ShutdownToken,
) -> Result<()> {
    writeln!(output, "Enter 'quitnow' to exit, 'help' for information.")?;
    prompt(&mut output)?;

    for line in input.lines() {
        let line = line?;
        match Command::parse(&line) {
            Some(Command::QuitNow) => {
                info!("QUITNOW received, stopping after the current cycle");
                token.cancel();
                return Ok(());
            }
            Some(command) => dispatch(&command, &mut output, streamer)?,
            None => {
                debug!("Ignoring console line {:?}", line);
                writeln!(output)?;
            }
        }
        prompt(&mut output)?;
    }
    info!("Console input closed");
    Ok(())
}

fn dispatch<W: Write>(command: &Command, output: &mut W, streamer: &Streamer) -> Result<()> {
    match command {
        Command::Help => writeln!(output, "\n{}\n", HELP_TEXT)?,
        Command::Add(symbol) => match streamer.add(symbol) {
            Ok(outcome) if outcome.changed() => writeln!(output, "Added {}.", symbol.to_uppercase())?,
            Ok(_) => writeln!(output, "{} is already tracked.", symbol.to_uppercase())?,
            Err(e) => writeln!(output, "{}", e)?,
        },
        Command::Remove(symbol) => match streamer.remove(symbol) {
            Ok(RemoveOutcome::Removed) => writeln!(output, "Removed {}.", symbol.to_uppercase())?,
            Ok(RemoveOutcome::NotInLocal) => writeln!(
                output,
                "Symbol {} is not in the local stocks list.",
                symbol.to_uppercase()
            )?,
            Ok(RemoveOutcome::NotInDatabase) => writeln!(
                output,
                "Symbol {} is not in the database.",
                symbol.to_uppercase()
            )?,
            Err(e) => writeln!(output, "{}", e)?,
        },
        Command::QuitNow => {}
    }
    Ok(())
}

fn prompt<W: Write>(output: &mut W) -> Result<()> {
    write!(output, "> ")?;
    output.flush()?;
    Ok(())
}
