use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Countdown lifecycle events emitted by [`crate::CountdownEngine`].
/// Consumers (the storefront client) react to these to update the widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CountdownStarted {
        timer_id: String,
        deadline: DateTime<Utc>,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Urgency threshold crossed; the pulse state latches on and never
    /// deactivates for this instance.
    PulseActivated {
        timer_id: String,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Terminal: the widget freezes and is hidden.
    CountdownExpired {
        timer_id: String,
        at: DateTime<Utc>,
    },
}
