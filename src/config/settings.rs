//! Configuration settings for grove.
//!
//! Settings are loaded from `~/.grove/config.json`. Keys this version does
//! not recognize survive a load/save round-trip, so older and newer builds
//! can share one file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Paths;
use crate::error::GroveError;

/// Recognized configuration keys, in display order.
pub const CONFIG_KEYS: [&str; 5] = [
    "focus_duration",
    "short_break",
    "long_break",
    "auto_start_breaks",
    "strict_mode",
];

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Default focus session duration in seconds.
    #[serde(default = "default_focus_duration")]
    pub focus_duration: i64,
    /// Short break duration in seconds.
    #[serde(default = "default_short_break")]
    pub short_break: i64,
    /// Long break duration in seconds.
    #[serde(default = "default_long_break")]
    pub long_break: i64,
    /// Start the break countdown automatically after a completed session.
    #[serde(default)]
    pub auto_start_breaks: bool,
    /// Fail running sessions on any focus loss.
    #[serde(default)]
    pub strict_mode: bool,
    /// Unrecognized keys, preserved on save.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

// Default value functions for serde
const fn default_focus_duration() -> i64 {
    1_500
}

const fn default_short_break() -> i64 {
    300
}

const fn default_long_break() -> i64 {
    900
}

impl Default for Config {
    fn default() -> Self {
        Self {
            focus_duration: default_focus_duration(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            auto_start_breaks: false,
            strict_mode: false,
            extra: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// A missing, unreadable, or unparseable file falls back to defaults so
    /// a broken config never blocks a session.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(&Paths::default().config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// A missing, unreadable, or unparseable file falls back to defaults so
    /// a broken config never blocks a session.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read config, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse config, using defaults");
                Self::default()
            }
        }
    }

    /// Save configuration to the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self) -> Result<(), GroveError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        self.save_to_path(&paths.config_file)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &Path) -> Result<(), GroveError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| GroveError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            GroveError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Value of a recognized key, rendered for display.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "focus_duration" => Some(self.focus_duration.to_string()),
            "short_break" => Some(self.short_break.to_string()),
            "long_break" => Some(self.long_break.to_string()),
            "auto_start_breaks" => Some(self.auto_start_breaks.to_string()),
            "strict_mode" => Some(self.strict_mode.to_string()),
            _ => None,
        }
    }

    /// Set a recognized key from its string representation.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, for durations that are not
    /// positive whole seconds, and for flag values other than
    /// `true`/`false`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), GroveError> {
        match key {
            "focus_duration" => self.focus_duration = parse_seconds(key, value)?,
            "short_break" => self.short_break = parse_seconds(key, value)?,
            "long_break" => self.long_break = parse_seconds(key, value)?,
            "auto_start_breaks" => self.auto_start_breaks = parse_flag(key, value)?,
            "strict_mode" => self.strict_mode = parse_flag(key, value)?,
            _ => return Err(GroveError::Config(format!("Unknown config key: {key}"))),
        }

        Ok(())
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<i64, GroveError> {
    let seconds: i64 = value.parse().map_err(|_| {
        GroveError::Config(format!("{key} must be a number of seconds, got {value:?}"))
    })?;

    if seconds <= 0 {
        return Err(GroveError::Config(format!(
            "{key} must be positive, got {seconds}"
        )));
    }

    Ok(seconds)
}

fn parse_flag(key: &str, value: &str) -> Result<bool, GroveError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(GroveError::Config(format!(
            "{key} must be true or false, got {value:?}"
        ))),
    }
}
