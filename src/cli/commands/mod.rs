//! Command implementations for grove.
//!
//! This module contains the implementation of all CLI commands.

mod plant;

pub use plant::plant;

use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::Shell;
use serde_json::json;

use crate::cli::args::{Cli, ConfigCommands, HistoryArgs, OutputFormat, StatsArgs};
use crate::config::{Config, Paths};
use crate::core::clock::SystemClock;
use crate::core::session::Session;
use crate::core::timer::parse_duration;
use crate::error::GroveError;
use crate::history::store::{HistoryFilter, HistoryStore};
use crate::output::{format_config, format_sessions, format_statistics, to_json};

fn open_store(paths: &Paths) -> HistoryStore {
    HistoryStore::new(paths.history_file.clone(), Arc::new(SystemClock))
}

/// Execute history command
///
/// # Errors
///
/// Returns an error for an unknown filter or if output formatting fails.
pub fn history(args: &HistoryArgs, format: OutputFormat) -> Result<String, GroveError> {
    let filter = HistoryFilter::parse(&args.filter).ok_or_else(|| {
        GroveError::Config(format!(
            "Unknown filter: {}. Supported: all, completed, failed",
            args.filter
        ))
    })?;

    let store = open_store(&Paths::default());
    let mut sessions: Vec<Session> = store
        .list()
        .into_iter()
        .filter(|s| filter.matches(s))
        .collect();
    sessions.reverse();
    sessions.truncate(args.limit);

    format_sessions(&sessions, "History", format)
}

/// Execute delete command
///
/// # Errors
///
/// Returns `GroveError::NotFound` if no session has the given ID.
pub fn delete(id: i64, format: OutputFormat) -> Result<String, GroveError> {
    let store = open_store(&Paths::default());

    if !store.delete(id) {
        return Err(GroveError::NotFound(format!("Session with ID: {id}")));
    }

    match format {
        OutputFormat::Json => to_json(&json!({ "deleted": id })),
        OutputFormat::Pretty => Ok(format!("Deleted session: {id}")),
    }
}

/// Execute clear command
///
/// # Errors
///
/// Refuses to run without `--force`.
pub fn clear(force: bool, format: OutputFormat) -> Result<String, GroveError> {
    if !force {
        return Err(GroveError::Config(
            "This will delete all session history.\nUse --force to confirm.".to_string(),
        ));
    }

    let store = open_store(&Paths::default());
    store.clear();

    match format {
        OutputFormat::Json => to_json(&json!({ "cleared": true })),
        OutputFormat::Pretty => Ok("Session history cleared.".to_string()),
    }
}

/// Execute stats command
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub fn stats(args: &StatsArgs, format: OutputFormat) -> Result<String, GroveError> {
    let store = open_store(&Paths::default());
    let statistics = store.statistics(args.days);

    format_statistics(&statistics, format)
}

/// Execute config subcommands
///
/// # Errors
///
/// Returns an error for unknown keys, invalid values, or write failures.
pub fn config(cmd: ConfigCommands, format: OutputFormat) -> Result<String, GroveError> {
    let paths = Paths::default();

    match cmd {
        ConfigCommands::Show => {
            let config = Config::load_from_path(&paths.config_file);
            format_config(&config, format)
        }
        ConfigCommands::Get { key } => {
            let config = Config::load_from_path(&paths.config_file);
            let value = config
                .get(&key)
                .ok_or_else(|| GroveError::Config(format!("Unknown config key: {key}")))?;
            match format {
                OutputFormat::Json => to_json(&json!({ "key": key, "value": value })),
                OutputFormat::Pretty => Ok(value),
            }
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_from_path(&paths.config_file);
            let value = normalize_duration_value(&key, &value);
            config.set(&key, &value)?;
            paths.ensure_dirs()?;
            config.save_to_path(&paths.config_file)?;
            match format {
                OutputFormat::Json => to_json(&json!({ "key": key, "value": value })),
                OutputFormat::Pretty => Ok(format!("Set {key} = {value}")),
            }
        }
        ConfigCommands::Path => match format {
            OutputFormat::Json => to_json(&json!({ "path": paths.config_file })),
            OutputFormat::Pretty => Ok(paths.config_file.display().to_string()),
        },
    }
}

/// Duration keys also accept 25m-style strings; bare numbers stay raw seconds.
fn normalize_duration_value(key: &str, value: &str) -> String {
    if !matches!(key, "focus_duration" | "short_break" | "long_break") {
        return value.to_string();
    }
    if value.parse::<i64>().is_ok() {
        return value.to_string();
    }
    parse_duration(value).map_or_else(|| value.to_string(), |seconds| seconds.to_string())
}

/// Execute completions command
///
/// # Errors
///
/// Returns an error for unknown shells.
pub fn completions(shell: &str) -> Result<String, GroveError> {
    let shell_type = shell_from_str(shell).ok_or_else(|| {
        GroveError::Config(format!(
            "Unknown shell: {shell}. Supported: bash, zsh, fish, powershell, elvish"
        ))
    })?;

    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell_type, &mut cmd, "grove", &mut buf);
    String::from_utf8(buf).map_err(|e| GroveError::Config(format!("UTF-8 error: {e}")))
}

fn shell_from_str(s: &str) -> Option<Shell> {
    match s.to_lowercase().as_str() {
        "bash" => Some(Shell::Bash),
        "zsh" => Some(Shell::Zsh),
        "fish" => Some(Shell::Fish),
        "powershell" | "ps" | "pwsh" => Some(Shell::PowerShell),
        "elvish" => Some(Shell::Elvish),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_from_str() {
        assert_eq!(shell_from_str("bash"), Some(Shell::Bash));
        assert_eq!(shell_from_str("ZSH"), Some(Shell::Zsh));
        assert_eq!(shell_from_str("pwsh"), Some(Shell::PowerShell));
        assert_eq!(shell_from_str("ksh"), None);
    }

    #[test]
    fn test_completions_rejects_unknown_shell() {
        assert!(completions("ksh").is_err());
    }

    #[test]
    fn test_completions_generates_script() {
        let script = completions("bash").unwrap();
        assert!(script.contains("grove"));
    }

    #[test]
    fn test_normalize_duration_value() {
        assert_eq!(normalize_duration_value("focus_duration", "1500"), "1500");
        assert_eq!(normalize_duration_value("focus_duration", "25m"), "1500");
        assert_eq!(normalize_duration_value("short_break", "5m"), "300");
        assert_eq!(normalize_duration_value("strict_mode", "true"), "true");
        assert_eq!(normalize_duration_value("focus_duration", "bogus"), "bogus");
    }
}
