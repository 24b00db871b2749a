//! Path resolution for grove configuration and data files.
//!
//! All grove data is stored in `~/.grove/`:
//! - `config.json` - Main configuration file
//! - `history.json` - Recorded focus sessions

use std::path::PathBuf;

use crate::error::GroveError;

/// Paths to grove configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.grove/`
    pub root: PathBuf,
    /// Config file: `~/.grove/config.json`
    pub config_file: PathBuf,
    /// History file: `~/.grove/history.json`
    pub history_file: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, GroveError> {
        let home = std::env::var("HOME")
            .map_err(|_| GroveError::Config("Could not determine home directory".to_string()))?;

        let root = PathBuf::from(home).join(".grove");

        Ok(Self {
            config_file: root.join("config.json"),
            history_file: root.join("history.json"),
            root,
        })
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.json"),
            history_file: root.join("history.json"),
            root,
        }
    }

    /// Ensure the root directory exists, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), GroveError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                GroveError::Config(format!("Failed to create directory {:?}: {}", self.root, e))
            })?;
        }

        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| {
            // Fallback to current directory if home cannot be determined
            Self::with_root(PathBuf::from(".grove"))
        })
    }
}
