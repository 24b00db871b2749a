//! Core focus-session engine.
//!
//! The engine that the CLI (or any other collaborator) drives:
//! - Countdown timer state machine with a background tick thread
//! - Window-focus monitor with push and poll observation
//! - Session recorder binding the two and persisting outcomes
//! - Clock abstraction so tests can script time

pub mod clock;
pub mod monitor;
pub mod recorder;
pub mod session;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use monitor::{FocusMonitor, FocusSignal};
pub use recorder::{SessionEvent, SessionParams, SessionRecorder};
pub use session::{Session, SessionStatus};
pub use timer::{
    format_duration, format_duration_mmss, parse_duration, render_progress_bar, FocusTimer,
    TimerCallbacks, TimerEvent, TimerState,
};
