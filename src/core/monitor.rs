//! Window-focus monitoring.
//!
//! A [`FocusMonitor`] tracks whether the user's window still has focus while
//! a session runs. The focus signal arrives two ways with identical
//! semantics: pushed by the UI layer through [`FocusMonitor::focus_changed`],
//! and pulled by a background poll of a [`FocusSignal`]. Both paths funnel
//! into one guarded transition, so a single held-to-lost change fires the
//! callback at most once however often it is observed.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Source of the window-focus signal, implemented by the UI layer.
///
/// `has_focus` is sampled under the monitor's internal lock so it must be
/// cheap and non-blocking (the CLI implementation reads an atomic flag).
#[cfg_attr(test, mockall::automock)]
pub trait FocusSignal: Send + Sync {
    /// Whether the window currently has focus.
    fn has_focus(&self) -> bool;
}

struct MonitorFlags {
    armed: bool,
    had_focus: bool,
    /// Bumped on every arm/disarm; a poll thread only acts while the epoch
    /// it was started under is still current.
    epoch: u64,
}

impl MonitorFlags {
    /// Apply one focus observation.
    ///
    /// Returns true when the loss callback should fire: the monitor is armed
    /// and focus just went from held to not held. `had_focus` is updated
    /// either way, so observations made while disarmed keep it current.
    fn observe(&mut self, has_focus: bool) -> bool {
        let fire = self.armed && self.had_focus && !has_focus;
        self.had_focus = has_focus;
        fire
    }
}

/// The monitor's shared flag cell.
///
/// Held by the session ledger as well so terminal outcomes can disarm
/// monitoring without keeping a handle to the full monitor (whose callback in
/// turn holds the ledger).
pub(crate) struct MonitorCell {
    flags: Mutex<MonitorFlags>,
    wake: Condvar,
}

impl MonitorCell {
    pub(crate) fn new() -> Self {
        // A session begins with the window focused.
        Self {
            flags: Mutex::new(MonitorFlags {
                armed: false,
                had_focus: true,
                epoch: 0,
            }),
            wake: Condvar::new(),
        }
    }

    /// Disarm monitoring and cancel the poll thread. Idempotent.
    pub(crate) fn disarm(&self) {
        {
            let mut flags = self.flags.lock();
            if !flags.armed {
                return;
            }
            flags.armed = false;
            flags.epoch += 1;
        }
        self.wake.notify_all();
    }
}

struct MonitorShared {
    poll_interval: Duration,
    signal: Arc<dyn FocusSignal>,
    on_focus_lost: Arc<dyn Fn() + Send + Sync>,
    cell: Arc<MonitorCell>,
}

/// Watches a window-focus signal and reports focus loss while armed.
///
/// Cloning returns another handle to the same monitor.
#[derive(Clone)]
pub struct FocusMonitor {
    shared: Arc<MonitorShared>,
}

impl FocusMonitor {
    /// Create a monitor polling `signal` once per second while armed.
    pub fn new(signal: Arc<dyn FocusSignal>, on_focus_lost: impl Fn() + Send + Sync + 'static) -> Self {
        Self::with_poll_interval(signal, Duration::from_secs(1), on_focus_lost)
    }

    /// Create a monitor with a custom poll interval.
    pub fn with_poll_interval(
        signal: Arc<dyn FocusSignal>,
        poll_interval: Duration,
        on_focus_lost: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self::from_parts(
            signal,
            poll_interval,
            Arc::new(MonitorCell::new()),
            on_focus_lost,
        )
    }

    /// Build a monitor around an existing flag cell.
    ///
    /// The session recorder constructs the cell first so its ledger can hold
    /// the cell without holding the monitor (and the monitor's callback can
    /// in turn hold the ledger).
    pub(crate) fn from_parts(
        signal: Arc<dyn FocusSignal>,
        poll_interval: Duration,
        cell: Arc<MonitorCell>,
        on_focus_lost: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            shared: Arc::new(MonitorShared {
                poll_interval,
                signal,
                on_focus_lost: Arc::new(on_focus_lost),
                cell,
            }),
        }
    }

    /// Arm the monitor and launch the poll thread. Idempotent.
    pub fn start_monitoring(&self) {
        let epoch = {
            let mut flags = self.shared.cell.flags.lock();
            if flags.armed {
                return;
            }
            flags.armed = true;
            flags.epoch += 1;
            flags.epoch
        };
        let shared = Arc::clone(&self.shared);
        thread::spawn(move || poll_loop(&shared, epoch));
    }

    /// Disarm the monitor and cancel the poll thread. Idempotent.
    ///
    /// Focus observations keep updating the internal held-focus state while
    /// disarmed; they just never fire the callback.
    pub fn stop_monitoring(&self) {
        self.shared.cell.disarm();
    }

    /// Push a focus change observed by the UI layer.
    ///
    /// Fires the loss callback iff armed and this is a held-to-lost
    /// transition, exactly like a polled observation.
    pub fn focus_changed(&self, has_focus: bool) {
        let fire = self.shared.cell.flags.lock().observe(has_focus);
        if fire {
            (self.shared.on_focus_lost)();
        }
    }

    /// Whether the monitor is currently armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.shared.cell.flags.lock().armed
    }
}

/// Poll loop for one armed interval, identified by its epoch.
///
/// The signal is sampled and the transition applied under the flag lock, so
/// a poll can never act on a sample that predates a pushed observation. The
/// callback fires after the lock is released.
fn poll_loop(shared: &MonitorShared, epoch: u64) {
    let mut deadline = Instant::now() + shared.poll_interval;
    loop {
        let fire = {
            let mut flags = shared.cell.flags.lock();
            while flags.epoch == epoch && Instant::now() < deadline {
                let _ = shared.cell.wake.wait_until(&mut flags, deadline);
            }
            if flags.epoch != epoch || !flags.armed {
                return;
            }
            let has_focus = shared.signal.has_focus();
            flags.observe(has_focus)
        };
        deadline += shared.poll_interval;
        if fire {
            (shared.on_focus_lost)();
        }
    }
}
