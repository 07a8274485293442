//! Client-local evergreen deadline storage.
//!
//! One entry per timer id, value = RFC 3339 timestamp. The store freezes a
//! visitor's countdown deadline on first encounter and reuses it until it
//! expires; stale entries are overwritten lazily on the next encounter. The
//! server never persists these -- the scope of this store *is* the visitor
//! identity.
//!
//! When the backing database cannot be opened or written (the privacy-mode /
//! quota analog), the store degrades to computing a fresh deadline on every
//! call instead of failing the render.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};

/// Per-visitor persistent map of `timer_id -> deadline`.
pub struct DeadlineStore {
    /// `None` means storage is unavailable; deadlines are then recomputed on
    /// every call and the countdown restarts each load.
    conn: Option<Connection>,
}

impl DeadlineStore {
    /// Open the store at `~/.config/promotimer/deadlines.db`.
    ///
    /// Never fails: any open or migration error degrades to the
    /// storage-unavailable mode.
    pub fn open() -> Self {
        let conn = super::data_dir()
            .ok()
            .and_then(|dir| Connection::open(dir.join("deadlines.db")).ok());
        Self::from_connection(conn)
    }

    /// Open the store at an explicit path, degrading on failure.
    pub fn open_at(path: &Path) -> Self {
        Self::from_connection(Connection::open(path).ok())
    }

    /// An in-memory store (for tests).
    pub fn open_memory() -> Self {
        Self::from_connection(Connection::open_in_memory().ok())
    }

    /// A store with no backing storage at all.
    pub fn unavailable() -> Self {
        Self { conn: None }
    }

    fn from_connection(conn: Option<Connection>) -> Self {
        let conn = conn.and_then(|c| {
            c.execute_batch(
                "CREATE TABLE IF NOT EXISTS evergreen_deadlines (
                    timer_id TEXT PRIMARY KEY,
                    deadline TEXT NOT NULL
                );",
            )
            .ok()
            .map(|_| c)
        });
        Self { conn }
    }

    pub fn is_persistent(&self) -> bool {
        self.conn.is_some()
    }

    /// The stable deadline for an evergreen timer.
    ///
    /// Reuses a stored deadline while `deadline > now` -- repeated calls in
    /// that window return an identical value, no drift. Otherwise computes
    /// `now + duration_minutes`, persists it over any stale entry, and
    /// returns it.
    pub fn get_or_create(
        &self,
        timer_id: &str,
        duration_minutes: u32,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        if let Some(stored) = self.read(timer_id) {
            if stored > now {
                return stored;
            }
        }
        let deadline = now + Duration::minutes(i64::from(duration_minutes));
        self.write(timer_id, deadline);
        deadline
    }

    fn read(&self, timer_id: &str) -> Option<DateTime<Utc>> {
        let conn = self.conn.as_ref()?;
        let raw: String = conn
            .query_row(
                "SELECT deadline FROM evergreen_deadlines WHERE timer_id = ?1",
                params![timer_id],
                |row| row.get(0),
            )
            .ok()?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }

    /// Best-effort write; a failure simply means the next load recomputes.
    fn write(&self, timer_id: &str, deadline: DateTime<Utc>) {
        if let Some(conn) = self.conn.as_ref() {
            let _ = conn.execute(
                "INSERT OR REPLACE INTO evergreen_deadlines (timer_id, deadline) VALUES (?1, ?2)",
                params![timer_id, deadline.to_rfc3339()],
            );
        }
    }
}
