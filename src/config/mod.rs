//! Configuration management for grove.
//!
//! This module handles loading and saving configuration from `~/.grove/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{Config, CONFIG_KEYS};
