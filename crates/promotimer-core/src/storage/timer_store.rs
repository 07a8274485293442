//! SQLite-based timer storage.
//!
//! Backs the candidate supplier consumed by the delivery endpoint, plus the
//! management operations the CLI needs (create, list, delete, status).
//! Targeting and style are stored as JSON columns; timestamps as RFC 3339
//! text, like the rest of the stack.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::CandidateSupplier;
use crate::error::{CoreError, DatabaseError};
use crate::timer::{Timer, TimerStatus};

/// SQLite database of configured timers.
pub struct TimerStore {
    conn: Connection,
}

impl TimerStore {
    /// Open the store at `~/.config/promotimer/promotimer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = super::data_dir()?.join("promotimer.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), CoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS timers (
                    id               TEXT PRIMARY KEY,
                    shop             TEXT NOT NULL,
                    name             TEXT NOT NULL,
                    description      TEXT,
                    kind             TEXT NOT NULL,
                    status           TEXT NOT NULL DEFAULT 'active',
                    start_at         TEXT,
                    end_at           TEXT,
                    duration_minutes INTEGER,
                    targeting        TEXT NOT NULL,
                    style_config     TEXT NOT NULL,
                    impressions      INTEGER NOT NULL DEFAULT 0,
                    created_at       TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_timers_shop ON timers(shop);
                CREATE INDEX IF NOT EXISTS idx_timers_shop_status ON timers(shop, status);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    pub fn insert(&self, timer: &Timer) -> Result<(), CoreError> {
        timer.validate()?;
        self.conn
            .execute(
                "INSERT INTO timers (id, shop, name, description, kind, status, start_at, end_at,
                                     duration_minutes, targeting, style_config, impressions, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    timer.id,
                    timer.shop,
                    timer.name,
                    timer.description,
                    kind_str(timer),
                    status_str(timer.status),
                    timer.start_at.map(|t| t.to_rfc3339()),
                    timer.end_at.map(|t| t.to_rfc3339()),
                    timer.duration_minutes,
                    serde_json::to_string(&timer.targeting)?,
                    serde_json::to_string(&timer.style_config)?,
                    timer.impressions,
                    timer.created_at.to_rfc3339(),
                ],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<Timer>, CoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM timers WHERE id = ?1")
            .map_err(DatabaseError::from)?;
        let result = stmt.query_row(params![id], row_to_timer);
        match result {
            Ok(timer) => Ok(Some(timer)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e).into()),
        }
    }

    /// All timers for a shop, most recently created first.
    pub fn list(&self, shop: &str) -> Result<Vec<Timer>, CoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM timers WHERE shop = ?1 ORDER BY created_at DESC")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![shop], row_to_timer)
            .map_err(DatabaseError::from)?;
        let mut timers = Vec::new();
        for row in rows {
            timers.push(row.map_err(DatabaseError::from)?);
        }
        Ok(timers)
    }

    /// Delete a timer. Returns whether a row was removed.
    pub fn delete(&self, id: &str) -> Result<bool, CoreError> {
        let n = self
            .conn
            .execute("DELETE FROM timers WHERE id = ?1", params![id])
            .map_err(DatabaseError::from)?;
        Ok(n > 0)
    }

    pub fn set_status(&self, id: &str, status: TimerStatus) -> Result<(), CoreError> {
        let n = self
            .conn
            .execute(
                "UPDATE timers SET status = ?2 WHERE id = ?1",
                params![id, status_str(status)],
            )
            .map_err(DatabaseError::from)?;
        if n == 0 {
            return Err(DatabaseError::TimerNotFound(id.to_string()).into());
        }
        Ok(())
    }
}

impl CandidateSupplier for TimerStore {
    /// Coarse pre-filter only: active, and for fixed timers an end time still
    /// ahead of `now`. Start times and targeting are left to the resolver.
    fn list_active_candidates(
        &self,
        shop: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Timer>, CoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT * FROM timers
                 WHERE shop = ?1 AND status = 'active'
                   AND (kind = 'evergreen' OR end_at > ?2)
                 ORDER BY created_at DESC",
            )
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![shop, now.to_rfc3339()], row_to_timer)
            .map_err(DatabaseError::from)?;
        let mut timers = Vec::new();
        for row in rows {
            timers.push(row.map_err(DatabaseError::from)?);
        }
        Ok(timers)
    }

    fn record_impression(&self, timer_id: &str) -> Result<(), CoreError> {
        let n = self
            .conn
            .execute(
                "UPDATE timers SET impressions = impressions + 1 WHERE id = ?1",
                params![timer_id],
            )
            .map_err(DatabaseError::from)?;
        if n == 0 {
            return Err(DatabaseError::TimerNotFound(timer_id.to_string()).into());
        }
        Ok(())
    }
}

fn kind_str(timer: &Timer) -> &'static str {
    match timer.kind {
        crate::timer::TimerKind::Fixed => "fixed",
        crate::timer::TimerKind::Evergreen => "evergreen",
    }
}

fn status_str(status: TimerStatus) -> &'static str {
    match status {
        TimerStatus::Active => "active",
        TimerStatus::Scheduled => "scheduled",
        TimerStatus::Expired => "expired",
    }
}

fn row_to_timer(row: &Row<'_>) -> rusqlite::Result<Timer> {
    let kind: String = row.get("kind")?;
    let status: String = row.get("status")?;
    let targeting: String = row.get("targeting")?;
    let style: String = row.get("style_config")?;

    Ok(Timer {
        id: row.get("id")?,
        shop: row.get("shop")?,
        name: row.get("name")?,
        description: row.get("description")?,
        kind: match kind.as_str() {
            "fixed" => crate::timer::TimerKind::Fixed,
            _ => crate::timer::TimerKind::Evergreen,
        },
        status: match status.as_str() {
            "scheduled" => TimerStatus::Scheduled,
            "expired" => TimerStatus::Expired,
            _ => TimerStatus::Active,
        },
        start_at: parse_ts(row, "start_at")?,
        end_at: parse_ts(row, "end_at")?,
        duration_minutes: row.get("duration_minutes")?,
        targeting: serde_json::from_str(&targeting).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
        })?,
        style_config: serde_json::from_str(&style).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, Box::new(e))
        })?,
        impressions: row.get("impressions")?,
        created_at: parse_ts(row, "created_at")?.unwrap_or_else(Utc::now),
    })
}

fn parse_ts(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(column)?;
    match raw {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{StyleConfig, Targeting, TimerKind};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn fixed_timer(id: &str, end_in_hours: i64, created_offset_min: i64) -> Timer {
        Timer {
            id: id.to_string(),
            shop: "demo.myshopify.com".to_string(),
            name: format!("Timer {id}"),
            description: Some("Sale ends soon".to_string()),
            kind: TimerKind::Fixed,
            status: TimerStatus::Active,
            start_at: None,
            end_at: Some(now() + Duration::hours(end_in_hours)),
            duration_minutes: None,
            targeting: Targeting::All,
            style_config: StyleConfig::default(),
            impressions: 0,
            created_at: now() + Duration::minutes(created_offset_min),
        }
    }

    #[test]
    fn insert_and_read_back_round_trip() {
        let store = TimerStore::open_memory().unwrap();
        let mut timer = fixed_timer("t1", 24, 0);
        timer.targeting = Targeting::Product {
            product_ids: vec!["P1".to_string(), "P2".to_string()],
        };
        store.insert(&timer).unwrap();

        let loaded = store.get("t1").unwrap().unwrap();
        assert_eq!(loaded.name, "Timer t1");
        assert_eq!(loaded.kind, TimerKind::Fixed);
        assert_eq!(loaded.end_at, timer.end_at);
        assert_eq!(loaded.targeting, timer.targeting);
        assert_eq!(loaded.style_config, StyleConfig::default());
    }

    #[test]
    fn insert_rejects_invalid_timer() {
        let store = TimerStore::open_memory().unwrap();
        let mut timer = fixed_timer("t1", 24, 0);
        timer.end_at = None;
        assert!(store.insert(&timer).is_err());
        assert!(store.get("t1").unwrap().is_none());
    }

    #[test]
    fn candidates_exclude_lapsed_and_inactive() {
        let store = TimerStore::open_memory().unwrap();
        store.insert(&fixed_timer("live", 24, 0)).unwrap();
        store.insert(&fixed_timer("over", -1, 1)).unwrap();
        let mut paused = fixed_timer("paused", 24, 2);
        paused.status = TimerStatus::Scheduled;
        store.insert(&paused).unwrap();
        let mut evergreen = fixed_timer("green", 0, 3);
        evergreen.kind = TimerKind::Evergreen;
        evergreen.end_at = None;
        evergreen.duration_minutes = Some(90);
        store.insert(&evergreen).unwrap();

        let ids: Vec<String> = store
            .list_active_candidates("demo.myshopify.com", now())
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["green".to_string(), "live".to_string()]);
    }

    #[test]
    fn candidates_are_most_recent_first() {
        let store = TimerStore::open_memory().unwrap();
        store.insert(&fixed_timer("older", 24, 0)).unwrap();
        store.insert(&fixed_timer("newer", 24, 30)).unwrap();
        let ids: Vec<String> = store
            .list_active_candidates("demo.myshopify.com", now())
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["newer".to_string(), "older".to_string()]);
    }

    #[test]
    fn candidates_are_scoped_to_shop() {
        let store = TimerStore::open_memory().unwrap();
        store.insert(&fixed_timer("mine", 24, 0)).unwrap();
        let mut other = fixed_timer("theirs", 24, 0);
        other.shop = "other.myshopify.com".to_string();
        store.insert(&other).unwrap();
        let candidates = store
            .list_active_candidates("demo.myshopify.com", now())
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "mine");
    }

    #[test]
    fn impressions_increment_in_place() {
        let store = TimerStore::open_memory().unwrap();
        store.insert(&fixed_timer("t1", 24, 0)).unwrap();
        store.record_impression("t1").unwrap();
        store.record_impression("t1").unwrap();
        assert_eq!(store.get("t1").unwrap().unwrap().impressions, 2);
    }

    #[test]
    fn impression_on_unknown_timer_is_an_error() {
        let store = TimerStore::open_memory().unwrap();
        assert!(store.record_impression("nope").is_err());
    }

    #[test]
    fn set_status_and_delete() {
        let store = TimerStore::open_memory().unwrap();
        store.insert(&fixed_timer("t1", 24, 0)).unwrap();
        store.set_status("t1", TimerStatus::Expired).unwrap();
        assert_eq!(
            store.get("t1").unwrap().unwrap().status,
            TimerStatus::Expired
        );
        assert!(store
            .list_active_candidates("demo.myshopify.com", now())
            .unwrap()
            .is_empty());
        assert!(store.delete("t1").unwrap());
        assert!(!store.delete("t1").unwrap());
    }
}
