mod deadline_store;
pub mod timer_store;

pub use deadline_store::DeadlineStore;
pub use timer_store::TimerStore;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::timer::Timer;

/// The candidate source the resolution engine reads from.
///
/// Implementations must return only `status = active` timers, but the engine
/// does not trust them to have applied temporal or targeting filters -- both
/// are re-validated before selection.
pub trait CandidateSupplier {
    /// Timers for `shop` that are plausible candidates at `now`, ordered
    /// most recently created first (the implicit tie-break).
    fn list_active_candidates(&self, shop: &str, now: DateTime<Utc>)
        -> Result<Vec<Timer>, CoreError>;

    /// Atomically add one impression to the timer's counter.
    fn record_impression(&self, timer_id: &str) -> Result<(), CoreError>;
}

/// Returns `~/.config/promotimer[-dev]/` based on PROMOTIMER_ENV.
///
/// Set PROMOTIMER_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PROMOTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("promotimer-dev")
    } else {
        base_dir.join("promotimer")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
