//! Display formatting for durations and timestamps.
//!
//! These take `now` explicitly so the "today"/"yesterday" logic is
//! deterministic under test.

use chrono::{DateTime, Datelike, Local};
use std::fmt::Write as _;
use std::time::Duration;

/// Format a duration as `"1h 2m 3s"`, eliding zero components.
/// Zero becomes `"0s"`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h ");
    }
    if minutes > 0 {
        let _ = write!(out, "{minutes}m ");
    }
    if seconds > 0 || out.is_empty() {
        let _ = write!(out, "{seconds}s");
    }
    out.trim_end().to_string()
}

/// Format a duration to minute precision: `"1h 2m"` or `"42m"`.
pub fn format_duration_short(d: Duration) -> String {
    let secs = d.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Format a timestamp for display, shortening it the closer it is to `now`:
/// clock time today, `Yesterday 15:04`, `Jan 2 15:04` within the year, and
/// the full date otherwise.
pub fn format_human_datetime(t: DateTime<Local>, now: DateTime<Local>) -> String {
    let date = t.date_naive();
    let today = now.date_naive();

    if date == today {
        return t.format("%H:%M").to_string();
    }
    if Some(date) == today.pred_opt() {
        return format!("Yesterday {}", t.format("%H:%M"));
    }
    if t.year() == now.year() {
        return t.format("%b %-d %H:%M").to_string();
    }
    t.format("%b %-d, %Y %H:%M").to_string()
}
