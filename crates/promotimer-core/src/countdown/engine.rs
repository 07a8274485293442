//! Countdown engine implementation.
//!
//! The countdown engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick_at()` on a
//! one-second cadence and for stopping permanently once `Expired` is reached
//! or the consuming view is torn down.
//!
//! ## State Transitions
//!
//! ```text
//! Pending -> Running -> Expired
//! ```
//!
//! `Expired` is terminal; a new page load / new resolution starts a fresh
//! instance rather than re-entering `Running`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::timer::Urgency;

/// Remaining time below which a `pulse`-urgency widget starts pulsing.
const URGENCY_WINDOW_MS: u64 = 3_600_000;

/// Frozen digits rendered once the countdown has expired.
pub const EXPIRED_DIGITS: &str = "00 : 00 : 00 : 00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Pending,
    Running,
    Expired,
}

/// Core countdown state machine for one resolved timer instance.
///
/// Operates on wall-clock deltas against a fixed deadline -- no internal
/// thread. The deadline is computed upstream (fixed: `end_at`; evergreen:
/// the per-visitor deadline store) and never changes for this instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownEngine {
    timer_id: String,
    deadline: DateTime<Utc>,
    urgency: Urgency,
    state: CountdownState,
    /// Latched on when the urgency window is entered; never cleared, even if
    /// time were somehow extended.
    pulse: bool,
}

impl CountdownEngine {
    pub fn new(timer_id: impl Into<String>, deadline: DateTime<Utc>, urgency: Urgency) -> Self {
        Self {
            timer_id: timer_id.into(),
            deadline,
            urgency,
            state: CountdownState::Pending,
            pulse: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    pub fn pulse_active(&self) -> bool {
        self.pulse
    }

    /// The widget is hidden once expired.
    pub fn is_visible(&self) -> bool {
        self.state != CountdownState::Expired
    }

    /// Milliseconds until the deadline, saturating at zero.
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> u64 {
        let ms = self.deadline.signed_duration_since(now).num_milliseconds();
        ms.max(0) as u64
    }

    /// Rendered digits for the current instant.
    pub fn digits(&self, now: DateTime<Utc>) -> String {
        if self.state == CountdownState::Expired {
            return EXPIRED_DIGITS.to_string();
        }
        format_digits(self.remaining_ms(now))
    }

    // ── Ticking ──────────────────────────────────────────────────────

    /// Advance the state machine to `now`. Call once per second.
    ///
    /// Returns the event produced by this tick, if any. Once `Expired` is
    /// reached every further tick is a no-op; callers must also cancel their
    /// periodic timer at that point.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            CountdownState::Pending => {
                let remaining = self.remaining_ms(now);
                if remaining == 0 {
                    return Some(self.expire(now));
                }
                self.state = CountdownState::Running;
                self.check_pulse(now);
                Some(Event::CountdownStarted {
                    timer_id: self.timer_id.clone(),
                    deadline: self.deadline,
                    remaining_ms: remaining,
                    at: now,
                })
            }
            CountdownState::Running => {
                if self.remaining_ms(now) == 0 {
                    return Some(self.expire(now));
                }
                if self.check_pulse(now) {
                    return Some(Event::PulseActivated {
                        timer_id: self.timer_id.clone(),
                        remaining_ms: self.remaining_ms(now),
                        at: now,
                    });
                }
                None
            }
            CountdownState::Expired => None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn expire(&mut self, now: DateTime<Utc>) -> Event {
        self.state = CountdownState::Expired;
        Event::CountdownExpired {
            timer_id: self.timer_id.clone(),
            at: now,
        }
    }

    /// Returns true when the pulse latch flips on during this call.
    fn check_pulse(&mut self, now: DateTime<Utc>) -> bool {
        if self.pulse || self.urgency != Urgency::Pulse {
            return false;
        }
        if self.remaining_ms(now) < URGENCY_WINDOW_MS {
            self.pulse = true;
            return true;
        }
        false
    }
}

/// Format remaining milliseconds as `"DDd : HHh : MMm : SSs"`.
///
/// Hours, minutes and seconds are zero-padded to two digits; the day count
/// is padded to two digits and grows beyond that as needed.
pub fn format_digits(remaining_ms: u64) -> String {
    let days = remaining_ms / 86_400_000;
    let hours = (remaining_ms / 3_600_000) % 24;
    let minutes = (remaining_ms / 60_000) % 60;
    let seconds = (remaining_ms / 1_000) % 60;
    format!("{days:02}d : {hours:02}h : {minutes:02}m : {seconds:02}s")
}
