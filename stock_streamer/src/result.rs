//! Result type alias of the streamer.
use crate::error::StreamError;

/// Streamer-wide `Result` alias with `StreamError` as the default error.
pub type Result<T, E = StreamError> = std::result::Result<T, E>;
