//! Session records.
//!
//! A [`Session`] is the immutable, persisted result of one focus attempt.
//! Records are created only by the session recorder when a session reaches a
//! terminal outcome, and destroyed only by explicit delete or clear.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Terminal outcome of a focus session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// The timer ran for the full planned duration
    Completed,
    /// The user gave up on the session
    Failed,
    /// Ended by an external event (focus loss, app exit)
    Interrupted,
}

impl SessionStatus {
    /// Get display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Interrupted => "Interrupted",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One recorded focus session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Store-assigned ID (None until persisted)
    pub id: Option<i64>,
    /// When the session started, epoch seconds
    pub start_time: i64,
    /// When the session reached its outcome, epoch seconds
    pub end_time: i64,
    /// Planned duration in seconds
    pub planned_duration: i64,
    /// Seconds actually spent, end minus start
    pub actual_duration: i64,
    /// Terminal outcome
    pub status: SessionStatus,
    /// Optional free-form notes
    #[serde(default)]
    pub notes: String,
}

impl Session {
    /// Build a finished record from its timestamps.
    ///
    /// The end time is clamped so it can never precede the start time, and
    /// the actual duration always equals their difference.
    #[must_use]
    pub fn finished(
        start_time: i64,
        end_time: i64,
        planned_duration: i64,
        status: SessionStatus,
        notes: String,
    ) -> Self {
        let end_time = end_time.max(start_time);
        Self {
            id: None,
            start_time,
            end_time,
            planned_duration,
            actual_duration: end_time - start_time,
            status,
            notes,
        }
    }

    /// Start time in the local timezone, for display.
    #[must_use]
    pub fn started_at_local(&self) -> Option<DateTime<Local>> {
        DateTime::from_timestamp(self.start_time, 0).map(|t| t.with_timezone(&Local))
    }

    /// End time in the local timezone, for display.
    #[must_use]
    pub fn ended_at_local(&self) -> Option<DateTime<Local>> {
        DateTime::from_timestamp(self.end_time, 0).map(|t| t.with_timezone(&Local))
    }
}
