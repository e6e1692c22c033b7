//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `ParseError`, so functions can simply return `Result<T>`.
use crate::error::ParseError;

/// Workspace-wide `Result` alias with `ParseError` as the default error.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;
