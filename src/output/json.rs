//! JSON output formatting for grove.
//!
//! This module provides functions for formatting session data as JSON.

use serde::Serialize;
use serde_json::json;

use crate::config::Config;
use crate::core::session::Session;
use crate::error::GroveError;
use crate::history::stats::Statistics;

/// Format recorded sessions as JSON
///
/// # Errors
///
/// Returns `GroveError::Parse` if JSON serialization fails.
pub fn format_sessions_json(sessions: &[Session], list_name: &str) -> Result<String, GroveError> {
    let output = json!({
        "list": list_name,
        "count": sessions.len(),
        "items": sessions
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format a single recorded session as JSON
///
/// # Errors
///
/// Returns `GroveError::Parse` if JSON serialization fails.
pub fn format_session_json(session: &Session) -> Result<String, GroveError> {
    Ok(serde_json::to_string_pretty(session)?)
}

/// Format statistics as JSON
///
/// # Errors
///
/// Returns `GroveError::Parse` if JSON serialization fails.
pub fn format_statistics_json(stats: &Statistics) -> Result<String, GroveError> {
    Ok(serde_json::to_string_pretty(stats)?)
}

/// Format the configuration as JSON
///
/// # Errors
///
/// Returns `GroveError::Parse` if JSON serialization fails.
pub fn format_config_json(config: &Config) -> Result<String, GroveError> {
    Ok(serde_json::to_string_pretty(config)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `GroveError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, GroveError> {
    Ok(serde_json::to_string_pretty(value)?)
}
