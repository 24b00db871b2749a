//! Session orchestration.
//!
//! A [`SessionRecorder`] binds a [`FocusTimer`] and a [`FocusMonitor`] into
//! one session lifecycle: it keeps monitoring in lockstep with the timer,
//! decides the outcome of each session, persists exactly one record per
//! terminal outcome, and forwards engine notifications to the UI layer.
//!
//! The one-record guarantee is structural. The in-flight session lives in a
//! locked `Option`; finalization takes it, so of all the paths that can end
//! a session (completion, give-up, focus loss, forced close, external fail)
//! whichever runs first gets the value and writes the record, and every
//! later path finds the cell empty.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::clock::Clock;
use crate::core::monitor::{FocusMonitor, FocusSignal, MonitorCell};
use crate::core::session::{Session, SessionStatus};
use crate::core::timer::{FocusTimer, TimerCallbacks, TimerState};
use crate::error::GroveError;
use crate::history::stats::Statistics;
use crate::history::store::{HistoryFilter, HistoryStore};

/// Notification forwarded to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// One countdown second elapsed; carries the remaining seconds
    Tick(i64),
    /// The session ran to completion and was recorded
    Completed,
    /// The timer was failed (give-up or interruption)
    Failed,
    /// Window focus was lost while monitored; the session was interrupted
    FocusLost,
}

/// Parameters for the sessions a recorder runs.
#[derive(Debug, Clone)]
pub struct SessionParams {
    /// Planned duration in seconds
    pub duration: i64,
    /// Fail the session on any focus loss
    pub strict: bool,
    /// Notes attached to each recorded session
    pub notes: String,
}

/// Everything the terminal-outcome paths need.
///
/// Deliberately free of timer and monitor handles: timer callbacks hold the
/// ledger, and the monitor callback holds the ledger plus a timer handle, so
/// keeping handles out of here keeps the ownership graph acyclic.
struct Ledger {
    params: SessionParams,
    store: HistoryStore,
    clock: Arc<dyn Clock>,
    /// Start time of the in-flight session, if any.
    active_start: Mutex<Option<i64>>,
    monitor_cell: Arc<MonitorCell>,
    on_event: Arc<dyn Fn(SessionEvent) + Send + Sync>,
}

impl Ledger {
    /// End the in-flight session with the given outcome.
    ///
    /// Takes the active start time, disarms monitoring, and persists the
    /// record. Returns `None` when no session was in flight, which is how
    /// every late or duplicate terminal path turns into a no-op.
    fn finalize(&self, status: SessionStatus) -> Option<Session> {
        let start_time = self.active_start.lock().take()?;
        self.monitor_cell.disarm();
        let record = Session::finished(
            start_time,
            self.clock.now(),
            self.params.duration,
            status,
            self.params.notes.clone(),
        );
        Some(self.store.append(record))
    }

    fn forward(&self, event: SessionEvent) {
        (self.on_event)(event);
    }
}

/// Orchestrates one timer and one monitor into recorded focus sessions.
///
/// A recorder is reusable: after a session reaches a terminal outcome,
/// `begin` starts the next one with the same parameters.
pub struct SessionRecorder {
    ledger: Arc<Ledger>,
    timer: FocusTimer,
    monitor: FocusMonitor,
}

impl SessionRecorder {
    /// Create a recorder with one-second tick and poll intervals.
    ///
    /// `on_event` receives every outbound notification; it is called from
    /// background threads and must not block for long.
    ///
    /// # Errors
    ///
    /// Returns [`GroveError::InvalidDuration`] if the planned duration is
    /// zero or negative.
    pub fn new(
        params: SessionParams,
        store: HistoryStore,
        clock: Arc<dyn Clock>,
        signal: Arc<dyn FocusSignal>,
        on_event: impl Fn(SessionEvent) + Send + Sync + 'static,
    ) -> Result<Self, GroveError> {
        Self::with_intervals(
            params,
            store,
            clock,
            signal,
            Duration::from_secs(1),
            Duration::from_secs(1),
            on_event,
        )
    }

    /// Create a recorder with custom tick and poll intervals.
    ///
    /// Tests use millisecond intervals to run the real background threads
    /// fast.
    ///
    /// # Errors
    ///
    /// Returns [`GroveError::InvalidDuration`] if the planned duration is
    /// zero or negative.
    pub fn with_intervals(
        params: SessionParams,
        store: HistoryStore,
        clock: Arc<dyn Clock>,
        signal: Arc<dyn FocusSignal>,
        tick_interval: Duration,
        poll_interval: Duration,
        on_event: impl Fn(SessionEvent) + Send + Sync + 'static,
    ) -> Result<Self, GroveError> {
        let cell = Arc::new(MonitorCell::new());
        let ledger = Arc::new(Ledger {
            params,
            store,
            clock,
            active_start: Mutex::new(None),
            monitor_cell: Arc::clone(&cell),
            on_event: Arc::new(on_event),
        });

        let timer = {
            let tick = Arc::clone(&ledger);
            let complete = Arc::clone(&ledger);
            let fail = Arc::clone(&ledger);
            FocusTimer::with_tick_interval(
                ledger.params.duration,
                tick_interval,
                TimerCallbacks::new()
                    .on_tick(move |remaining| tick.forward(SessionEvent::Tick(remaining)))
                    .on_complete(move || {
                        // Suppressed when another path already decided the
                        // outcome (a give-up racing the final tick).
                        if complete.finalize(SessionStatus::Completed).is_some() {
                            complete.forward(SessionEvent::Completed);
                        }
                    })
                    .on_fail(move || {
                        // Records only externally caused failures; give-up
                        // and focus loss have already finalized by the time
                        // they fail the timer. The UI learns about the dead
                        // timer either way.
                        fail.finalize(SessionStatus::Interrupted);
                        fail.forward(SessionEvent::Failed);
                    }),
            )?
        };

        let monitor = {
            let lost = Arc::clone(&ledger);
            let lost_timer = timer.clone();
            FocusMonitor::from_parts(signal, poll_interval, cell, move || {
                if lost_timer.state() != TimerState::Running {
                    return;
                }
                if lost.finalize(SessionStatus::Interrupted).is_some() {
                    lost.forward(SessionEvent::FocusLost);
                    lost_timer.fail();
                }
            })
        };

        Ok(Self {
            ledger,
            timer,
            monitor,
        })
    }

    /// Start a session: note the start time, start the countdown, and arm
    /// focus monitoring when running strict.
    ///
    /// # Errors
    ///
    /// Returns [`GroveError::SessionActive`] while a session is running or
    /// paused.
    pub fn begin(&self) -> Result<(), GroveError> {
        {
            let mut active = self.ledger.active_start.lock();
            if active.is_some() || self.timer.state().is_active() {
                return Err(GroveError::SessionActive);
            }
            self.timer.stop();
            *active = Some(self.ledger.clock.now());
        }
        self.timer.start();
        if self.ledger.params.strict {
            self.monitor.start_monitoring();
        }
        Ok(())
    }

    /// Pause the countdown. Monitoring is disarmed until resume.
    ///
    /// Returns false when there is nothing running to pause.
    pub fn pause(&self) -> bool {
        let accepted = self.timer.pause();
        if accepted {
            self.monitor.stop_monitoring();
        }
        accepted
    }

    /// Resume a paused countdown, re-arming monitoring when strict.
    ///
    /// Returns false when there is nothing paused to resume.
    pub fn resume(&self) -> bool {
        let accepted = self.timer.resume();
        if accepted && self.ledger.params.strict {
            self.monitor.start_monitoring();
        }
        accepted
    }

    /// Give up the in-flight session. The caller has already confirmed.
    ///
    /// Records the session as failed, then fails the timer (notifying the
    /// UI). Returns the record, or `None` when no session was in flight.
    pub fn give_up(&self) -> Option<Session> {
        let record = self.ledger.finalize(SessionStatus::Failed)?;
        self.timer.fail();
        Some(record)
    }

    /// Shut the recorder down before process exit. The caller has already
    /// confirmed.
    ///
    /// An in-flight session is recorded as interrupted; timer and monitor
    /// are quiesced either way. Returns the record, if one was written.
    pub fn close(&self) -> Option<Session> {
        let record = self.ledger.finalize(SessionStatus::Interrupted);
        self.monitor.stop_monitoring();
        self.timer.stop();
        record
    }

    /// Push a focus observation from the UI layer.
    pub fn focus_changed(&self, has_focus: bool) {
        self.monitor.focus_changed(has_focus);
    }

    /// Current timer state.
    #[must_use]
    pub fn state(&self) -> TimerState {
        self.timer.state()
    }

    /// Remaining seconds on the countdown.
    #[must_use]
    pub fn remaining(&self) -> i64 {
        self.timer.remaining()
    }

    /// Planned session duration in seconds.
    #[must_use]
    pub fn planned_duration(&self) -> i64 {
        self.timer.duration()
    }

    /// Snapshot of recorded sessions passing the filter, in append order.
    #[must_use]
    pub fn list_history(&self, filter: HistoryFilter) -> Vec<Session> {
        self.ledger
            .store
            .list()
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect()
    }

    /// Statistics over the trailing `days` days (0 = all time).
    #[must_use]
    pub fn get_statistics(&self, days: i64) -> Statistics {
        self.ledger.store.statistics(days)
    }
}

impl Drop for SessionRecorder {
    fn drop(&mut self) {
        self.monitor.stop_monitoring();
        self.timer.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::monitor::MockFocusSignal;
    use std::sync::mpsc;
    use tempfile::TempDir;

    const FAST: Duration = Duration::from_millis(5);
    // Poll interval long enough that only pushed focus changes are observed.
    const NEVER: Duration = Duration::from_secs(600);

    struct Rig {
        recorder: SessionRecorder,
        clock: ManualClock,
        store: HistoryStore,
        events: mpsc::Receiver<SessionEvent>,
        _dir: TempDir,
    }

    fn rig(duration: i64, strict: bool) -> Rig {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::new(1_000_000);
        let store = HistoryStore::new(dir.path().join("history.json"), Arc::new(clock.clone()));

        let mut signal = MockFocusSignal::new();
        signal.expect_has_focus().return_const(true);

        let (tx, rx) = mpsc::channel();
        let recorder = SessionRecorder::with_intervals(
            SessionParams {
                duration,
                strict,
                notes: String::new(),
            },
            store.clone(),
            Arc::new(clock.clone()),
            Arc::new(signal),
            FAST,
            NEVER,
            move |event| {
                let _ = tx.send(event);
            },
        )
        .unwrap();

        Rig {
            recorder,
            clock,
            store,
            events: rx,
            _dir: dir,
        }
    }

    fn wait_for(rig: &Rig, wanted: SessionEvent) -> bool {
        for _ in 0..400 {
            match rig.events.recv_timeout(Duration::from_secs(2)) {
                Ok(event) if event == wanted => return true,
                Ok(_) => {}
                Err(_) => return false,
            }
        }
        false
    }

    fn drain_terminal_events(rig: &Rig) -> Vec<SessionEvent> {
        let mut seen = Vec::new();
        while let Ok(event) = rig.events.recv_timeout(FAST * 10) {
            if !matches!(event, SessionEvent::Tick(_)) {
                seen.push(event);
            }
        }
        seen
    }

    #[test]
    fn test_begin_rejects_concurrent_session() {
        let rig = rig(100, false);
        rig.recorder.begin().unwrap();

        assert!(matches!(
            rig.recorder.begin(),
            Err(GroveError::SessionActive)
        ));
    }

    #[test]
    fn test_completion_records_exactly_one_session() {
        let rig = rig(3, false);
        rig.recorder.begin().unwrap();
        rig.clock.advance(3);

        assert!(wait_for(&rig, SessionEvent::Completed));
        assert_eq!(rig.recorder.state(), TimerState::Completed);

        let records = rig.store.list();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, SessionStatus::Completed);
        assert_eq!(records[0].actual_duration, 3);
        assert_eq!(records[0].planned_duration, 3);
    }

    #[test]
    fn test_give_up_records_failed_once() {
        let rig = rig(1_500, false);
        rig.recorder.begin().unwrap();
        rig.clock.advance(10);

        let record = rig.recorder.give_up().unwrap();
        assert_eq!(record.status, SessionStatus::Failed);
        assert_eq!(record.actual_duration, 10);
        assert_eq!(rig.recorder.state(), TimerState::Failed);

        // The fail path triggered by give_up must not write a second record.
        assert_eq!(rig.store.list().len(), 1);
        assert!(rig.recorder.give_up().is_none());
        assert_eq!(rig.store.list().len(), 1);

        let terminal = drain_terminal_events(&rig);
        assert_eq!(terminal, vec![SessionEvent::Failed]);
    }

    #[test]
    fn test_strict_focus_loss_interrupts_session() {
        let rig = rig(1_500, true);
        rig.recorder.begin().unwrap();
        rig.clock.advance(3);

        rig.recorder.focus_changed(false);
        assert!(wait_for(&rig, SessionEvent::Failed));
        assert_eq!(rig.recorder.state(), TimerState::Failed);

        let records = rig.store.list();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, SessionStatus::Interrupted);
        assert_eq!(records[0].actual_duration, 3);
    }

    #[test]
    fn test_focus_loss_emits_lost_then_failed() {
        let rig = rig(1_500, true);
        rig.recorder.begin().unwrap();

        rig.recorder.focus_changed(false);
        assert!(wait_for(&rig, SessionEvent::FocusLost));
        assert!(wait_for(&rig, SessionEvent::Failed));
    }

    #[test]
    fn test_focus_loss_ignored_without_strict_mode() {
        let rig = rig(1_500, false);
        rig.recorder.begin().unwrap();

        rig.recorder.focus_changed(false);
        assert_eq!(rig.recorder.state(), TimerState::Running);
        assert!(rig.store.list().is_empty());
    }

    #[test]
    fn test_pause_suspends_monitoring_until_resume() {
        let rig = rig(1_500, true);
        rig.recorder.begin().unwrap();

        assert!(rig.recorder.pause());
        rig.recorder.focus_changed(false);
        assert_eq!(rig.recorder.state(), TimerState::Paused);
        assert!(rig.store.list().is_empty());

        assert!(rig.recorder.resume());
        rig.recorder.focus_changed(true);
        rig.recorder.focus_changed(false);
        assert!(wait_for(&rig, SessionEvent::Failed));
        assert_eq!(rig.store.list().len(), 1);
        assert_eq!(rig.store.list()[0].status, SessionStatus::Interrupted);
    }

    #[test]
    fn test_pause_and_resume_report_acceptance() {
        let rig = rig(1_500, false);

        assert!(!rig.recorder.pause());
        assert!(!rig.recorder.resume());

        rig.recorder.begin().unwrap();
        assert!(rig.recorder.pause());
        assert!(!rig.recorder.pause());
        assert!(rig.recorder.resume());
        assert!(!rig.recorder.resume());
    }

    #[test]
    fn test_close_records_interrupted_while_active() {
        let rig = rig(1_500, false);
        rig.recorder.begin().unwrap();
        rig.clock.advance(5);

        let record = rig.recorder.close().unwrap();
        assert_eq!(record.status, SessionStatus::Interrupted);
        assert_eq!(record.actual_duration, 5);
        assert_eq!(rig.store.list().len(), 1);

        // Closing again has nothing left to record.
        assert!(rig.recorder.close().is_none());
        assert_eq!(rig.store.list().len(), 1);
    }

    #[test]
    fn test_close_without_session_is_a_noop() {
        let rig = rig(1_500, false);
        assert!(rig.recorder.close().is_none());
        assert!(rig.store.list().is_empty());
    }

    #[test]
    fn test_recorder_is_reusable_after_terminal_outcome() {
        let rig = rig(1_500, false);

        rig.recorder.begin().unwrap();
        rig.clock.advance(10);
        rig.recorder.give_up().unwrap();

        rig.recorder.begin().unwrap();
        rig.clock.advance(20);
        let second = rig.recorder.close().unwrap();

        assert_eq!(second.actual_duration, 20);
        let records = rig.store.list();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, SessionStatus::Failed);
        assert_eq!(records[1].status, SessionStatus::Interrupted);
    }

    #[test]
    fn test_list_history_applies_filter() {
        let rig = rig(1_500, false);

        rig.recorder.begin().unwrap();
        rig.recorder.give_up().unwrap();
        rig.recorder.begin().unwrap();
        rig.recorder.close().unwrap();

        assert_eq!(rig.recorder.list_history(HistoryFilter::All).len(), 2);
        assert_eq!(rig.recorder.list_history(HistoryFilter::Failed).len(), 1);
        assert_eq!(rig.recorder.list_history(HistoryFilter::Completed).len(), 0);
    }

    #[test]
    fn test_get_statistics_counts_recorded_sessions() {
        let rig = rig(1_500, false);

        rig.recorder.begin().unwrap();
        rig.clock.advance(10);
        rig.recorder.give_up().unwrap();

        let stats = rig.recorder.get_statistics(0);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total_focus_seconds, 10);
    }
}
