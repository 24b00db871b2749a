//! Countdown timer for focus sessions.
//!
//! A [`FocusTimer`] owns the remaining-time countdown for one session. State
//! changes go through a single closed transition table, the countdown runs on
//! a background thread, and tick/complete/fail notifications are delivered
//! through caller-supplied callbacks. Also provides duration
//! parsing/formatting helpers shared by the CLI.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

use crate::error::GroveError;

/// Timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerState {
    /// No countdown in flight; initial state and the result of a reset
    Idle,
    /// Counting down
    Running,
    /// Countdown halted, remaining time preserved
    Paused,
    /// Countdown reached zero (terminal)
    Completed,
    /// Countdown was forced to fail (terminal)
    Failed,
}

/// Events accepted by the timer transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Begin counting (from Idle) or resume (from Paused)
    Start,
    /// Halt the countdown, keeping remaining time
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Reset to Idle, restoring the full duration
    Stop,
    /// Force the Failed terminal state
    Fail,
    /// Countdown reached zero
    Expire,
}

impl TimerState {
    /// The transition table.
    ///
    /// Returns the successor state for a legal `(state, event)` pair and
    /// `None` for an illegal one. Every state change in this module goes
    /// through here; illegal pairs leave the timer untouched.
    #[must_use]
    pub const fn next(self, event: TimerEvent) -> Option<Self> {
        match (self, event) {
            (Self::Idle, TimerEvent::Start)
            | (Self::Paused, TimerEvent::Start | TimerEvent::Resume) => Some(Self::Running),
            (Self::Running, TimerEvent::Pause) => Some(Self::Paused),
            (Self::Running, TimerEvent::Expire) => Some(Self::Completed),
            (Self::Idle | Self::Running | Self::Paused, TimerEvent::Fail) => Some(Self::Failed),
            (_, TimerEvent::Stop) => Some(Self::Idle),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check if a session is in flight (running or paused).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

type TickFn = Arc<dyn Fn(i64) + Send + Sync>;
type NotifyFn = Arc<dyn Fn() + Send + Sync>;

/// Notification hooks fired by a [`FocusTimer`].
///
/// All callbacks are invoked outside the timer's internal lock, so they may
/// call back into the timer freely.
#[derive(Clone, Default)]
pub struct TimerCallbacks {
    on_tick: Option<TickFn>,
    on_complete: Option<NotifyFn>,
    on_fail: Option<NotifyFn>,
}

impl TimerCallbacks {
    /// Create an empty callback set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per elapsed second while running, with the remaining
    /// seconds after the decrement (`duration - 1` down to `0`).
    #[must_use]
    pub fn on_tick(mut self, f: impl Fn(i64) + Send + Sync + 'static) -> Self {
        self.on_tick = Some(Arc::new(f));
        self
    }

    /// Called exactly once when the countdown reaches zero while running.
    #[must_use]
    pub fn on_complete(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(f));
        self
    }

    /// Called exactly once when the timer is forced to fail.
    #[must_use]
    pub fn on_fail(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_fail = Some(Arc::new(f));
        self
    }
}

struct TimerCell {
    state: TimerState,
    remaining: i64,
    /// Bumped by every control operation; a countdown thread only acts while
    /// the epoch it was started under is still current.
    epoch: u64,
}

struct TimerShared {
    duration: i64,
    tick_interval: Duration,
    callbacks: TimerCallbacks,
    cell: Mutex<TimerCell>,
    wake: Condvar,
}

/// A countdown timer with a background tick thread.
///
/// Cloning returns another handle to the same timer.
#[derive(Clone)]
pub struct FocusTimer {
    shared: Arc<TimerShared>,
}

impl FocusTimer {
    /// Create a timer for `duration` seconds with one tick per second.
    ///
    /// # Errors
    ///
    /// Returns [`GroveError::InvalidDuration`] if `duration` is zero or
    /// negative.
    pub fn new(duration: i64, callbacks: TimerCallbacks) -> Result<Self, GroveError> {
        Self::with_tick_interval(duration, Duration::from_secs(1), callbacks)
    }

    /// Create a timer with a custom tick interval.
    ///
    /// The remaining value still decrements by one whole second per tick;
    /// shorter intervals let tests exercise the real countdown thread in
    /// milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`GroveError::InvalidDuration`] if `duration` is zero or
    /// negative.
    pub fn with_tick_interval(
        duration: i64,
        tick_interval: Duration,
        callbacks: TimerCallbacks,
    ) -> Result<Self, GroveError> {
        if duration <= 0 {
            return Err(GroveError::InvalidDuration(duration));
        }
        Ok(Self {
            shared: Arc::new(TimerShared {
                duration,
                tick_interval,
                callbacks,
                cell: Mutex::new(TimerCell {
                    state: TimerState::Idle,
                    remaining: duration,
                    epoch: 0,
                }),
                wake: Condvar::new(),
            }),
        })
    }

    /// Start the countdown from `Idle`, or resume it from `Paused`.
    ///
    /// Starting from `Idle` resets remaining time to the full duration.
    /// Returns false (and changes nothing) from any other state.
    pub fn start(&self) -> bool {
        let epoch = {
            let mut cell = self.shared.cell.lock();
            let Some(next) = cell.state.next(TimerEvent::Start) else {
                return false;
            };
            if cell.state == TimerState::Idle {
                cell.remaining = self.shared.duration;
            }
            cell.state = next;
            cell.epoch += 1;
            cell.epoch
        };
        self.spawn_countdown(epoch);
        true
    }

    /// Halt a running countdown, preserving the remaining value exactly.
    ///
    /// Returns false from any state but `Running`.
    pub fn pause(&self) -> bool {
        {
            let mut cell = self.shared.cell.lock();
            let Some(next) = cell.state.next(TimerEvent::Pause) else {
                return false;
            };
            cell.state = next;
            cell.epoch += 1;
        }
        self.shared.wake.notify_all();
        true
    }

    /// Resume a paused countdown.
    ///
    /// Returns false from any state but `Paused`.
    pub fn resume(&self) -> bool {
        let epoch = {
            let mut cell = self.shared.cell.lock();
            let Some(next) = cell.state.next(TimerEvent::Resume) else {
                return false;
            };
            cell.state = next;
            cell.epoch += 1;
            cell.epoch
        };
        self.spawn_countdown(epoch);
        true
    }

    /// Reset to `Idle` from any state, restoring the full duration and
    /// cancelling any in-flight countdown.
    pub fn stop(&self) {
        {
            let mut cell = self.shared.cell.lock();
            if let Some(next) = cell.state.next(TimerEvent::Stop) {
                cell.state = next;
            }
            cell.remaining = self.shared.duration;
            cell.epoch += 1;
        }
        self.shared.wake.notify_all();
    }

    /// Force `Failed` from any non-terminal state, cancelling the countdown.
    ///
    /// Fires the fail callback exactly once per session before returning.
    /// Returns false (without firing) from `Completed` or `Failed`.
    pub fn fail(&self) -> bool {
        {
            let mut cell = self.shared.cell.lock();
            let Some(next) = cell.state.next(TimerEvent::Fail) else {
                return false;
            };
            cell.state = next;
            cell.epoch += 1;
        }
        self.shared.wake.notify_all();
        if let Some(cb) = &self.shared.callbacks.on_fail {
            cb();
        }
        true
    }

    /// Get the current state.
    #[must_use]
    pub fn state(&self) -> TimerState {
        self.shared.cell.lock().state
    }

    /// Get the remaining seconds.
    #[must_use]
    pub fn remaining(&self) -> i64 {
        self.shared.cell.lock().remaining
    }

    /// Get the configured duration in seconds.
    #[must_use]
    pub fn duration(&self) -> i64 {
        self.shared.duration
    }

    fn spawn_countdown(&self, epoch: u64) {
        let shared = Arc::clone(&self.shared);
        thread::spawn(move || countdown(&shared, epoch));
    }
}

enum TickOutcome {
    Tick(i64),
    Complete,
    Cancelled,
}

/// Countdown loop for one start/resume, identified by its epoch.
///
/// Each cycle sleeps out one tick interval on the condvar, then decides under
/// the lock whether this thread is still current and what the decrement
/// produced. Any control operation bumps the epoch, which cancels this thread
/// within one interval. Callbacks fire after the lock is released.
fn countdown(shared: &TimerShared, epoch: u64) {
    let mut deadline = Instant::now() + shared.tick_interval;
    loop {
        let outcome = {
            let mut cell = shared.cell.lock();
            while cell.epoch == epoch && Instant::now() < deadline {
                let _ = shared.wake.wait_until(&mut cell, deadline);
            }
            if cell.epoch != epoch || cell.state != TimerState::Running {
                TickOutcome::Cancelled
            } else {
                cell.remaining -= 1;
                if cell.remaining <= 0 {
                    // Zero observed before any cancellation: completion wins.
                    if let Some(next) = cell.state.next(TimerEvent::Expire) {
                        cell.state = next;
                    }
                    TickOutcome::Complete
                } else {
                    TickOutcome::Tick(cell.remaining)
                }
            }
        };
        match outcome {
            TickOutcome::Tick(remaining) => {
                deadline += shared.tick_interval;
                if let Some(cb) = &shared.callbacks.on_tick {
                    cb(remaining);
                }
            }
            TickOutcome::Complete => {
                if let Some(cb) = &shared.callbacks.on_tick {
                    cb(0);
                }
                if let Some(cb) = &shared.callbacks.on_complete {
                    cb();
                }
                return;
            }
            TickOutcome::Cancelled => return,
        }
    }
}

/// Format a duration as MM:SS.
#[must_use]
pub fn format_duration_mmss(seconds: i64) -> String {
    let total_seconds = seconds.abs();
    let minutes = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{minutes:02}:{secs:02}")
}

/// Format a duration as a human-readable string.
#[must_use]
pub fn format_duration(seconds: i64) -> String {
    let total_minutes = seconds / 60;

    if total_minutes < 1 {
        return format!("{} second{}", seconds, if seconds == 1 { "" } else { "s" });
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        if minutes > 0 {
            format!(
                "{} hour{}, {} minute{}",
                hours,
                if hours == 1 { "" } else { "s" },
                minutes,
                if minutes == 1 { "" } else { "s" }
            )
        } else {
            format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
        }
    } else {
        format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    }
}

/// Parse a duration string like "25m", "1h30m", "90s".
///
/// A bare number is taken as minutes. Returns the total in seconds.
#[must_use]
pub fn parse_duration(s: &str) -> Option<i64> {
    let s = s.trim().to_lowercase();

    // Try parsing as just a number (assume minutes)
    if let Ok(minutes) = s.parse::<i64>() {
        return if minutes > 0 { Some(minutes * 60) } else { None };
    }

    let mut total_seconds: i64 = 0;
    let mut current_num = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            current_num.push(c);
        } else if !current_num.is_empty() {
            let num: i64 = current_num.parse().ok()?;
            current_num.clear();

            match c {
                'h' => total_seconds += num * 3600,
                'm' => total_seconds += num * 60,
                's' => total_seconds += num,
                _ => return None,
            }
        }
    }

    // Handle trailing number without unit (assume minutes)
    if !current_num.is_empty() {
        let num: i64 = current_num.parse().ok()?;
        total_seconds += num * 60;
    }

    if total_seconds > 0 {
        Some(total_seconds)
    } else {
        None
    }
}

/// Render a progress bar.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn render_progress_bar(progress: f64, width: usize) -> String {
    let filled = (progress.clamp(0.0, 1.0) * width as f64) as usize;
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}
