//! Error types for grove.

use thiserror::Error;

/// Errors that can occur in grove.
///
/// History persistence failures never appear here: the store degrades to an
/// empty log on read errors and drops the write on write errors, so the only
/// fallible file is the config file.
#[derive(Debug, Error)]
pub enum GroveError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timer duration must be a positive number of seconds
    #[error("Invalid duration: {0} seconds (must be positive)")]
    InvalidDuration(i64),

    /// A session is already active
    #[error("A session is already active; finish or give it up first")]
    SessionActive,

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Terminal interaction error
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// JSON serialization error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
