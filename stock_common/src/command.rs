//! Console commands accepted by the interactive control loop.
//!
//! A line is a keyword followed by an optional argument, separated by
//! whitespace. Keywords are case-insensitive. Lines that do not form a
//! complete command are ignored by the caller, so parsing returns `Option`.
use strum_macros::{Display, EnumString};

/// Text printed for `HELP`.
pub const HELP_TEXT: &str = "A list of commands.\n\
'add SYMBOL' -- add a stock symbol to the database.\n\
'remove SYMBOL' -- remove a stock symbol from the database.\n\
'quitnow' -- exit the application.";

/// Command keywords as typed on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Keyword {
    /// `ADD <symbol>`
    Add,
    /// `REMOVE <symbol>`
    Remove,
    /// `HELP`
    Help,
    /// `QUITNOW`
    #[strum(serialize = "QUITNOW")]
    QuitNow,
}

/// Parsed console command.
///
/// Symbol arguments are kept as typed; validation belongs to the watch-list,
/// which rejects bad symbols without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Track a symbol.
    Add(String),
    /// Stop tracking a symbol.
    Remove(String),
    /// Print the command list.
    Help,
    /// Stop the poller and leave the console.
    QuitNow,
}

impl Command {
    /// Parse one console line.
    ///
    /// Returns `None` for blank lines, unknown keywords and `ADD`/`REMOVE`
    /// without an argument. Tokens past the argument are ignored.
    pub fn parse(line: &str) -> Option<Command> {
        let mut parts = line.split_whitespace();
        let keyword: Keyword = parts.next()?.parse().ok()?;
        match keyword {
            Keyword::Add => parts.next().map(|s| Command::Add(s.to_string())),
            Keyword::Remove => parts.next().map(|s| Command::Remove(s.to_string())),
            Keyword::Help => Some(Command::Help),
            Keyword::QuitNow => Some(Command::QuitNow),
        }
    }

    /// Keyword of this command.
    pub fn keyword(&self) -> Keyword {
        match self {
            Command::Add(_) => Keyword::Add,
            Command::Remove(_) => Keyword::Remove,
            Command::Help => Keyword::Help,
            Command::QuitNow => Keyword::QuitNow,
        }
    }
}
