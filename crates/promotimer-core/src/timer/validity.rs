//! Temporal validity guard.
//!
//! Rejects timers whose scheduled window excludes "now". Applied as a filter
//! stage before priority ranking, so a fixed timer whose window has lapsed or
//! not yet opened is never selected even if it would outrank others.

use chrono::{DateTime, Utc};

use super::model::{Timer, TimerKind, TimerStatus};

/// Whether a timer is currently allowed to be shown.
///
/// Fixed timers need an open window: started (or no `start_at`) and an
/// `end_at` strictly in the future. Evergreen timers have no absolute window;
/// their duration is visitor-relative, so `Active` status is enough.
pub fn is_eligible(timer: &Timer, now: DateTime<Utc>) -> bool {
    if timer.status != TimerStatus::Active {
        return false;
    }
    match timer.kind {
        TimerKind::Evergreen => true,
        TimerKind::Fixed => {
            let started = timer.start_at.is_none_or(|start| start <= now);
            let ends_later = timer.end_at.is_some_and(|end| end > now);
            started && ends_later
        }
    }
}

/// Whether a fixed timer's window has not yet opened.
///
/// Re-applied by the resolver mid-scan: candidate suppliers pre-filter on
/// end time but not start time, so a not-yet-open timer can still appear in
/// the candidate list.
pub fn starts_in_future(timer: &Timer, now: DateTime<Utc>) -> bool {
    timer.kind == TimerKind::Fixed && timer.start_at.is_some_and(|start| start > now)
}
