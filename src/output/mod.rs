//! Output formatting for grove.
//!
//! This module provides formatters for displaying session data in various formats.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::core::session::Session;
use crate::error::GroveError;
use crate::history::stats::Statistics;

pub use json::*;
pub use pretty::*;

/// Format recorded sessions based on output format
///
/// # Errors
///
/// Returns `GroveError::Parse` if JSON serialization fails.
pub fn format_sessions(
    sessions: &[Session],
    title: &str,
    format: OutputFormat,
) -> Result<String, GroveError> {
    match format {
        OutputFormat::Pretty => Ok(format_sessions_pretty(sessions, title)),
        OutputFormat::Json => format_sessions_json(sessions, title),
    }
}

/// Format a single recorded session based on output format
///
/// # Errors
///
/// Returns `GroveError::Parse` if JSON serialization fails.
pub fn format_session(session: &Session, format: OutputFormat) -> Result<String, GroveError> {
    match format {
        OutputFormat::Pretty => Ok(format_session_pretty(session)),
        OutputFormat::Json => format_session_json(session),
    }
}

/// Format statistics based on output format
///
/// # Errors
///
/// Returns `GroveError::Parse` if JSON serialization fails.
pub fn format_statistics(stats: &Statistics, format: OutputFormat) -> Result<String, GroveError> {
    match format {
        OutputFormat::Pretty => Ok(format_statistics_pretty(stats)),
        OutputFormat::Json => format_statistics_json(stats),
    }
}

/// Format the configuration based on output format
///
/// # Errors
///
/// Returns `GroveError::Parse` if JSON serialization fails.
pub fn format_config(config: &Config, format: OutputFormat) -> Result<String, GroveError> {
    match format {
        OutputFormat::Pretty => Ok(format_config_pretty(config)),
        OutputFormat::Json => format_config_json(config),
    }
}
