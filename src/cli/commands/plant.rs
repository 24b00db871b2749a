//! Interactive focus session command.
//!
//! Runs the live countdown in the foreground. Engine notifications and
//! terminal input are multiplexed onto one channel; the countdown line is
//! redrawn in place; terminal focus events feed the focus signal. All
//! interactive chrome goes to stderr so stdout stays clean for the final
//! summary (and for --output json).

use std::io;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::cli::args::{OutputFormat, PlantArgs};
use crate::config::{Config, Paths};
use crate::core::clock::SystemClock;
use crate::core::monitor::FocusSignal;
use crate::core::recorder::{SessionEvent, SessionParams, SessionRecorder};
use crate::core::timer::{
    format_duration, format_duration_mmss, parse_duration, render_progress_bar,
};
use crate::error::GroveError;
use crate::history::store::HistoryStore;
use crate::output::format_session;

/// Everything the session loop can receive.
enum PlantEvent {
    Engine(SessionEvent),
    Key(KeyCode, KeyModifiers),
    Focus(bool),
}

/// Confirmation the next keypress answers.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    GiveUp,
    Quit,
}

/// Focus state as last reported by the terminal.
struct TermFocusSignal {
    focused: AtomicBool,
}

impl TermFocusSignal {
    fn set(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }
}

impl FocusSignal for TermFocusSignal {
    fn has_focus(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }
}

/// Execute plant command
///
/// # Errors
///
/// Returns an error for an invalid duration, when a raw-mode terminal is
/// unavailable, or if the session cannot be started.
pub fn plant(args: PlantArgs, format: OutputFormat) -> Result<String, GroveError> {
    let paths = Paths::default();
    paths.ensure_dirs()?;
    let config = Config::load_from_path(&paths.config_file);

    let duration = match args.duration {
        Some(ref text) => parse_duration(text)
            .ok_or_else(|| GroveError::Config(format!("Invalid duration: {text}")))?,
        None => config.focus_duration,
    };
    let strict = args.strict || config.strict_mode;
    let params = SessionParams {
        duration,
        strict,
        notes: args.notes.unwrap_or_default(),
    };

    let store = HistoryStore::new(paths.history_file.clone(), Arc::new(SystemClock));
    let signal = Arc::new(TermFocusSignal {
        focused: AtomicBool::new(true),
    });

    let (tx, rx) = mpsc::channel();
    let engine_tx = tx.clone();
    let recorder = SessionRecorder::new(
        params,
        store.clone(),
        Arc::new(SystemClock),
        Arc::clone(&signal) as Arc<dyn FocusSignal>,
        move |event| {
            let _ = engine_tx.send(PlantEvent::Engine(event));
        },
    )?;

    enable_raw_mode()
        .map_err(|e| GroveError::Terminal(format!("Failed to enable raw mode: {e}")))?;
    // Not every terminal reports focus; without it strict mode never fires.
    let _ = execute!(io::stderr(), event::EnableFocusChange);

    if let Err(e) = recorder.begin() {
        let _ = execute!(io::stderr(), event::DisableFocusChange);
        disable_raw_mode().ok();
        return Err(e);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let input_stop = Arc::clone(&stop);
    let input = thread::spawn(move || forward_terminal_events(&tx, &input_stop));

    eprint!(
        "🌱 Planting for {}{}. p pause · r resume · g give up · q quit\r\n",
        format_duration(duration),
        if strict { " (strict)" } else { "" }
    );
    draw_countdown(duration, duration);

    run_session_loop(&recorder, &rx, &signal, duration);

    stop.store(true, Ordering::SeqCst);
    let closed = recorder.close();
    let _ = input.join();
    let _ = execute!(io::stderr(), event::DisableFocusChange);
    disable_raw_mode().ok();
    eprintln!();

    let record = closed.or_else(|| store.list().into_iter().last());
    match record {
        Some(session) => format_session(&session, format),
        None => Ok("No session recorded.".to_string()),
    }
}

/// Forward crossterm events into the session channel until told to stop.
fn forward_terminal_events(tx: &mpsc::Sender<PlantEvent>, stop: &AtomicBool) {
    while !stop.load(Ordering::SeqCst) {
        match event::poll(Duration::from_millis(200)) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(_) => break,
        }

        let forwarded = match event::read() {
            Ok(Event::Key(key)) => tx.send(PlantEvent::Key(key.code, key.modifiers)),
            Ok(Event::FocusGained) => tx.send(PlantEvent::Focus(true)),
            Ok(Event::FocusLost) => tx.send(PlantEvent::Focus(false)),
            Ok(_) => Ok(()),
            Err(_) => break,
        };

        if forwarded.is_err() {
            break;
        }
    }
}

/// Drive the session until a terminal outcome or a confirmed quit.
fn run_session_loop(
    recorder: &SessionRecorder,
    rx: &mpsc::Receiver<PlantEvent>,
    signal: &TermFocusSignal,
    duration: i64,
) {
    let mut pending = Pending::None;

    loop {
        let Ok(item) = rx.recv() else {
            break;
        };

        match item {
            PlantEvent::Engine(SessionEvent::Tick(remaining)) => {
                if pending == Pending::None {
                    draw_countdown(remaining, duration);
                }
            }
            PlantEvent::Engine(SessionEvent::Completed | SessionEvent::Failed) => break,
            PlantEvent::Engine(SessionEvent::FocusLost) => {
                eprint!("\r\n{}\r\n", "Focus lost - the tree withered.".red());
            }
            PlantEvent::Focus(has_focus) => {
                signal.set(has_focus);
                recorder.focus_changed(has_focus);
            }
            PlantEvent::Key(code, modifiers) => {
                if handle_key(recorder, &mut pending, duration, code, modifiers) {
                    break;
                }
            }
        }
    }
}

/// Handle one keypress. Returns true when the loop should end.
fn handle_key(
    recorder: &SessionRecorder,
    pending: &mut Pending,
    duration: i64,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> bool {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        // Second Ctrl-C (or Ctrl-C with nothing running) always exits.
        if *pending == Pending::Quit || !recorder.state().is_active() {
            return true;
        }
        *pending = Pending::Quit;
        prompt("End the session early? [y/N] ");
        return false;
    }

    match *pending {
        Pending::GiveUp => {
            *pending = Pending::None;
            if matches!(code, KeyCode::Char('y' | 'Y')) {
                // A session that already completed has nothing to give up.
                return recorder.give_up().is_none();
            }
            eprint!("\r\n");
            false
        }
        Pending::Quit => {
            *pending = Pending::None;
            if matches!(code, KeyCode::Char('y' | 'Y')) {
                return true;
            }
            eprint!("\r\n");
            false
        }
        Pending::None => match code {
            KeyCode::Char('p') => {
                if recorder.pause() {
                    eprint!(
                        "\r\n⏸  Paused at {} - press r to resume\r\n",
                        format_duration_mmss(recorder.remaining())
                    );
                }
                false
            }
            KeyCode::Char('r') => {
                if recorder.resume() {
                    draw_countdown(recorder.remaining(), duration);
                }
                false
            }
            KeyCode::Char('g') => {
                if recorder.state().is_active() {
                    *pending = Pending::GiveUp;
                    prompt("Give up this session? [y/N] ");
                }
                false
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                if recorder.state().is_active() {
                    *pending = Pending::Quit;
                    prompt("End the session early? [y/N] ");
                    false
                } else {
                    true
                }
            }
            _ => false,
        },
    }
}

fn prompt(message: &str) {
    eprint!("\r\n{message}");
    let _ = io::stderr().flush();
}

#[allow(clippy::cast_precision_loss)]
fn draw_countdown(remaining: i64, duration: i64) {
    let progress = if duration > 0 {
        (duration - remaining) as f64 / duration as f64
    } else {
        0.0
    };

    eprint!(
        "\r🌱 {} {} ",
        format_duration_mmss(remaining),
        render_progress_bar(progress, 24)
    );
    let _ = io::stderr().flush();
}
