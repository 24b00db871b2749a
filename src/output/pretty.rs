use colored::Colorize;

use crate::config::{Config, CONFIG_KEYS};
use crate::core::session::{Session, SessionStatus};
use crate::core::timer::{format_duration, format_duration_mmss, render_progress_bar};
use crate::history::stats::Statistics;

/// Status marker for recorded sessions.
#[must_use]
pub const fn status_icon(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Completed => "🌳",
        SessionStatus::Failed | SessionStatus::Interrupted => "🥀",
    }
}

fn colored_status(status: SessionStatus) -> colored::ColoredString {
    match status {
        SessionStatus::Completed => status.display_name().green(),
        SessionStatus::Failed => status.display_name().red(),
        SessionStatus::Interrupted => status.display_name().yellow(),
    }
}

/// Format a list of recorded sessions as a pretty table
pub fn format_sessions_pretty(sessions: &[Session], title: &str) -> String {
    if sessions.is_empty() {
        return format!("{} (0 sessions)\n  Nothing planted yet", title);
    }

    let mut output = format!("{} ({} sessions)\n", title, sessions.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for session in sessions {
        let started = session.started_at_local().map_or_else(
            || "unknown time".to_string(),
            |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
        );

        let mut line = format!(
            "{} {}  {}  {}",
            status_icon(session.status),
            started,
            format_duration_mmss(session.actual_duration),
            colored_status(session.status)
        );

        if let Some(id) = session.id {
            line.push_str(&format!("  {}", format!("#{id}").dimmed()));
        }

        if !session.notes.is_empty() {
            line.push_str(&format!("  {}", session.notes.dimmed()));
        }

        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Format a single recorded session as a summary block
pub fn format_session_pretty(session: &Session) -> String {
    let headline = match session.status {
        SessionStatus::Completed => "Session completed".green().bold(),
        SessionStatus::Failed => "Session failed".red().bold(),
        SessionStatus::Interrupted => "Session interrupted".yellow().bold(),
    };

    let mut output = format!("{} {}\n", status_icon(session.status), headline);

    if let Some(id) = session.id {
        output.push_str(&format!("  {}: {}\n", "ID".dimmed(), id));
    }

    if let Some(started) = session.started_at_local() {
        output.push_str(&format!(
            "  {}: {}\n",
            "Planted".dimmed(),
            started.format("%Y-%m-%d %H:%M:%S")
        ));
    }

    if let Some(ended) = session.ended_at_local() {
        output.push_str(&format!(
            "  {}: {}\n",
            "Ended".dimmed(),
            ended.format("%Y-%m-%d %H:%M:%S")
        ));
    }

    output.push_str(&format!(
        "  {}: {} of {}\n",
        "Focused".dimmed(),
        format_duration_mmss(session.actual_duration),
        format_duration_mmss(session.planned_duration)
    ));

    if !session.notes.is_empty() {
        output.push_str(&format!("  {}: {}\n", "Notes".dimmed(), session.notes));
    }

    output
}

/// Format statistics as a pretty block with a completion-rate bar
pub fn format_statistics_pretty(stats: &Statistics) -> String {
    let title = if stats.days == 0 {
        "Statistics (all time)".to_string()
    } else {
        format!("Statistics (last {} days)", stats.days)
    };

    let mut output = format!("{title}\n");
    output.push_str(&"─".repeat(40));
    output.push('\n');

    output.push_str(&format!("  {}: {}\n", "Sessions".dimmed(), stats.total));
    output.push_str(&format!(
        "  {}: {}\n",
        "Completed".dimmed(),
        stats.completed.to_string().green()
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Failed".dimmed(),
        stats.failed.to_string().red()
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Interrupted".dimmed(),
        stats.interrupted.to_string().yellow()
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Focus time".dimmed(),
        format_duration(stats.total_focus_seconds)
    ));
    output.push_str(&format!(
        "  {}: {} {:.0}%\n",
        "Completion".dimmed(),
        render_progress_bar(stats.completion_rate / 100.0, 20),
        stats.completion_rate
    ));

    output
}

/// Format the configuration as key/value lines
pub fn format_config_pretty(config: &Config) -> String {
    let mut output = "Configuration\n".to_string();
    output.push_str(&"─".repeat(40));
    output.push('\n');

    for key in CONFIG_KEYS {
        let Some(value) = config.get(key) else {
            continue;
        };

        let mut line = format!("  {}: {}", key.dimmed(), value);
        if matches!(key, "focus_duration" | "short_break" | "long_break") {
            if let Ok(seconds) = value.parse::<i64>() {
                line.push_str(&format!(
                    "  {}",
                    format!("({})", format_duration(seconds)).dimmed()
                ));
            }
        }

        output.push_str(&line);
        output.push('\n');
    }

    for (key, value) in &config.extra {
        output.push_str(&format!("  {}: {}\n", key.dimmed(), value));
    }

    output
}
