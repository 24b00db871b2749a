//! Aggregate statistics over session history.

use serde::Serialize;

use crate::core::session::{Session, SessionStatus};

/// Aggregate statistics for a range of session history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    /// Days the range covers (0 means all time)
    pub days: i64,
    /// Sessions in range
    pub total: usize,
    /// Sessions that ran to completion
    pub completed: usize,
    /// Sessions the user gave up
    pub failed: usize,
    /// Sessions ended by an external event
    pub interrupted: usize,
    /// Seconds spent across all sessions in range, whatever their outcome
    pub total_focus_seconds: i64,
    /// Completed share of the range, in percent (0 when the range is empty)
    pub completion_rate: f64,
}

/// Aggregate an already range-filtered set of sessions.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(days: i64, sessions: &[Session]) -> Statistics {
    let total = sessions.len();
    let mut completed = 0;
    let mut failed = 0;
    let mut interrupted = 0;
    let mut total_focus_seconds = 0;

    for session in sessions {
        match session.status {
            SessionStatus::Completed => completed += 1,
            SessionStatus::Failed => failed += 1,
            SessionStatus::Interrupted => interrupted += 1,
        }
        total_focus_seconds += session.actual_duration;
    }

    let completion_rate = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    };

    Statistics {
        days,
        total,
        completed,
        failed,
        interrupted,
        total_focus_seconds,
        completion_rate,
    }
}
