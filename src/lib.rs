//! grove - A focus session tracker for the terminal
//!
//! This crate provides the focus-session engine (countdown timer, focus-loss
//! monitor, session recorder, history store) and the `grove` command-line
//! interface built on top of it.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod history;
pub mod output;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use core::clock::{Clock, ManualClock, SystemClock};
pub use core::monitor::{FocusMonitor, FocusSignal};
pub use core::recorder::{SessionEvent, SessionParams, SessionRecorder};
pub use core::session::{Session, SessionStatus};
pub use core::timer::{FocusTimer, TimerState};
pub use error::GroveError;
pub use history::store::HistoryStore;
