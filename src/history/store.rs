//! Durable session history.
//!
//! Sessions live in a single JSON file, an array of records in append order.
//! The store deliberately trades durability for availability: a read failure
//! degrades to an empty log and a write failure drops that write with a
//! warning, so an I/O problem can never take down a running session.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::core::clock::Clock;
use crate::core::session::{Session, SessionStatus};
use crate::history::stats::{aggregate, Statistics};

/// Status filter for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFilter {
    /// Every record
    All,
    /// Only completed sessions
    Completed,
    /// Only failed sessions
    Failed,
}

impl HistoryFilter {
    /// Parse a filter from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" | "a" => Some(Self::All),
            "completed" | "complete" | "c" => Some(Self::Completed),
            "failed" | "fail" | "f" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Check whether a session passes this filter.
    #[must_use]
    pub const fn matches(self, session: &Session) -> bool {
        match self {
            Self::All => true,
            Self::Completed => matches!(session.status, SessionStatus::Completed),
            Self::Failed => matches!(session.status, SessionStatus::Failed),
        }
    }
}

struct StoreInner {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    /// Highest id this store has handed out. The lock also serializes every
    /// read-modify-write cycle on the file.
    last_id: Mutex<i64>,
}

/// Session log in a single JSON file.
///
/// Cloning returns another handle to the same store; file access is
/// serialized internally.
#[derive(Clone)]
pub struct HistoryStore {
    inner: Arc<StoreInner>,
}

impl HistoryStore {
    /// Open a store over the given file. The file may not exist yet; it is
    /// created on the first write.
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                path: path.into(),
                clock,
                last_id: Mutex::new(0),
            }),
        }
    }

    /// The file this store persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Snapshot of all records in append order.
    #[must_use]
    pub fn list(&self) -> Vec<Session> {
        let _guard = self.inner.last_id.lock();
        self.read()
    }

    /// Append a finished session to the log.
    ///
    /// A draft without an id gets one assigned: the clock time in
    /// milliseconds, bumped past the last id this store issued so two
    /// sessions in the same millisecond still differ. A caller-supplied id is
    /// kept as-is. Returns the stored record; if the underlying write fails
    /// the record is still returned, the write is dropped with a warning.
    pub fn append(&self, mut session: Session) -> Session {
        let mut last_id = self.inner.last_id.lock();

        let id = session
            .id
            .unwrap_or_else(|| (self.inner.clock.now() * 1_000).max(*last_id + 1));
        *last_id = (*last_id).max(id);
        session.id = Some(id);

        let mut sessions = self.read();
        sessions.push(session.clone());
        self.write(&sessions);
        session
    }

    /// Delete the record with the given id.
    ///
    /// Returns false without touching the file when no record matches.
    pub fn delete(&self, id: i64) -> bool {
        let _guard = self.inner.last_id.lock();

        let mut sessions = self.read();
        let before = sessions.len();
        sessions.retain(|s| s.id != Some(id));
        if sessions.len() == before {
            return false;
        }
        self.write(&sessions);
        true
    }

    /// Remove every record. Irreversible.
    pub fn clear(&self) {
        let _guard = self.inner.last_id.lock();
        self.write(&[]);
    }

    /// Aggregate statistics over the trailing `days` days (0 = all time).
    ///
    /// A session counts when its start time falls at or after
    /// `now - days * 86400`.
    #[must_use]
    pub fn statistics(&self, days: i64) -> Statistics {
        let sessions = self.list();
        let days = days.max(0);
        let cutoff = if days == 0 {
            i64::MIN
        } else {
            // An oversized window saturates to the all-time cutoff.
            self.inner
                .clock
                .now()
                .saturating_sub(days.saturating_mul(86_400))
        };

        let in_range: Vec<Session> = sessions
            .into_iter()
            .filter(|s| s.start_time >= cutoff)
            .collect();
        aggregate(days, &in_range)
    }

    fn read(&self) -> Vec<Session> {
        let raw = match fs::read_to_string(&self.inner.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.inner.path.display(), error = %e, "could not read history, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(path = %self.inner.path.display(), error = %e, "history file is not valid JSON, treating as empty");
                Vec::new()
            }
        }
    }

    fn write(&self, sessions: &[Session]) {
        if let Some(parent) = self.inner.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!(path = %parent.display(), error = %e, "could not create history directory, dropping write");
                    return;
                }
            }
        }
        let json = match serde_json::to_string_pretty(sessions) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "could not serialize history, dropping write");
                return;
            }
        };
        if let Err(e) = fs::write(&self.inner.path, json) {
            warn!(path = %self.inner.path.display(), error = %e, "could not write history, dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use tempfile::TempDir;

    fn store_at(dir: &TempDir, clock: ManualClock) -> HistoryStore {
        HistoryStore::new(dir.path().join("history.json"), Arc::new(clock))
    }

    fn finished(start: i64, actual: i64, status: SessionStatus) -> Session {
        Session::finished(start, start + actual, 1_500, status, String::new())
    }

    #[test]
    fn test_append_assigns_id_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, ManualClock::new(1_000));

        let stored = store.append(finished(990, 10, SessionStatus::Completed));
        assert_eq!(stored.id, Some(1_000_000));

        let listed = store.list();
        assert_eq!(listed, vec![stored]);
    }

    #[test]
    fn test_append_keeps_caller_supplied_id() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, ManualClock::new(1_000));

        let mut draft = finished(990, 10, SessionStatus::Completed);
        draft.id = Some(42);
        let stored = store.append(draft);

        assert_eq!(stored.id, Some(42));
        assert_eq!(store.list()[0].id, Some(42));
    }

    #[test]
    fn test_append_ids_stay_unique_under_frozen_clock() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, ManualClock::new(1_000));

        let first = store.append(finished(990, 10, SessionStatus::Completed));
        let second = store.append(finished(995, 5, SessionStatus::Failed));

        assert_eq!(first.id, Some(1_000_000));
        assert_eq!(second.id, Some(1_000_001));
    }

    #[test]
    fn test_delete_removes_only_the_target() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, ManualClock::new(1_000));

        let a = store.append(finished(100, 10, SessionStatus::Completed));
        let b = store.append(finished(200, 10, SessionStatus::Failed));
        let c = store.append(finished(300, 10, SessionStatus::Interrupted));

        assert!(store.delete(b.id.unwrap()));
        let remaining: Vec<Option<i64>> = store.list().iter().map(|s| s.id).collect();
        assert_eq!(remaining, vec![a.id, c.id]);
    }

    #[test]
    fn test_delete_missing_id_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, ManualClock::new(1_000));
        store.append(finished(100, 10, SessionStatus::Completed));

        assert!(!store.delete(999));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_clear_empties_the_log() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, ManualClock::new(1_000));
        store.append(finished(100, 10, SessionStatus::Completed));
        store.append(finished(200, 10, SessionStatus::Failed));

        store.clear();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, ManualClock::new(1_000));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json at all {").unwrap();

        let store = HistoryStore::new(&path, Arc::new(ManualClock::new(1_000)));
        assert!(store.list().is_empty());

        // The store keeps working; the next append rewrites the file.
        store.append(finished(100, 10, SessionStatus::Completed));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_write_failure_never_reaches_the_caller() {
        // Pointing the store at a directory makes every read and write fail.
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path(), Arc::new(ManualClock::new(1_000)));

        let stored = store.append(finished(100, 10, SessionStatus::Completed));
        assert!(stored.id.is_some());
        assert!(store.list().is_empty());
        assert!(!store.delete(1));
        store.clear();
    }

    #[test]
    fn test_statistics_filters_by_start_time() {
        let now = 1_700_000_000;
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, ManualClock::new(now));

        store.append(finished(now - 86_400, 1_500, SessionStatus::Completed));
        store.append(finished(now - 10 * 86_400, 900, SessionStatus::Failed));
        store.append(finished(now - 400 * 86_400, 600, SessionStatus::Interrupted));

        let week = store.statistics(7);
        assert_eq!(week.total, 1);
        assert_eq!(week.completed, 1);
        assert_eq!(week.total_focus_seconds, 1_500);

        let month = store.statistics(30);
        assert_eq!(month.total, 2);
        assert_eq!(month.failed, 1);
        assert_eq!(month.total_focus_seconds, 2_400);
    }

    #[test]
    fn test_statistics_all_time_equals_unfiltered_sum() {
        let now = 1_700_000_000;
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, ManualClock::new(now));

        // Records spanning multiple years.
        store.append(finished(now - 3 * 365 * 86_400, 1_500, SessionStatus::Completed));
        store.append(finished(now - 365 * 86_400, 1_200, SessionStatus::Completed));
        store.append(finished(now - 30 * 86_400, 300, SessionStatus::Failed));
        store.append(finished(now - 60, 60, SessionStatus::Interrupted));

        let all = store.statistics(0);
        assert_eq!(all.days, 0);
        assert_eq!(all.total, 4);
        assert_eq!(all.completed, 2);
        assert_eq!(all.failed, 1);
        assert_eq!(all.interrupted, 1);
        assert_eq!(all.total_focus_seconds, 3_060);
        assert!((all.completion_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_statistics_huge_window_counts_everything() {
        let now = 1_700_000_000;
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, ManualClock::new(now));
        store.append(finished(now - 60, 60, SessionStatus::Completed));

        // Wide enough that days * 86400 would overflow i64.
        let stats = store.statistics(i64::MAX / 86_400 + 1);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.total_focus_seconds, 60);
    }

    #[test]
    fn test_history_filter_parse_and_match() {
        assert_eq!(HistoryFilter::parse("all"), Some(HistoryFilter::All));
        assert_eq!(HistoryFilter::parse("Completed"), Some(HistoryFilter::Completed));
        assert_eq!(HistoryFilter::parse("f"), Some(HistoryFilter::Failed));
        assert_eq!(HistoryFilter::parse("bogus"), None);

        let done = finished(100, 10, SessionStatus::Completed);
        let interrupted = finished(200, 10, SessionStatus::Interrupted);
        assert!(HistoryFilter::All.matches(&interrupted));
        assert!(HistoryFilter::Completed.matches(&done));
        assert!(!HistoryFilter::Completed.matches(&interrupted));
        assert!(!HistoryFilter::Failed.matches(&done));
    }
}
