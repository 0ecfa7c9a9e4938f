//! SQLite-backed schedule store.

use crate::error::StoreError;
use crate::store::ScheduleStore;
use chrono::{NaiveDate, Utc};
use drill_core::parser::format_date;
use drill_core::SchedulingRecord;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;

type Result<T> = std::result::Result<T, StoreError>;

/// Local file store for scheduling records.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open database at path, creating it and its parent directory if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(super::schema::SCHEMA)?;
        self.conn.execute_batch(super::schema::INIT_SCHEMA_VERSION)?;
        Ok(())
    }

}

struct RawRecord {
    interval: u32,
    repetitions: u32,
    next_due: String,
    weak: bool,
}

impl RawRecord {
    fn into_record(self, key: &str) -> Result<SchedulingRecord> {
        let next_due = NaiveDate::parse_from_str(&self.next_due, "%Y-%m-%d").map_err(|_| {
            StoreError::InvalidData(format!("bad next_due {:?} for {}", self.next_due, key))
        })?;
        Ok(SchedulingRecord {
            interval: self.interval,
            repetitions: self.repetitions,
            next_due,
            weak: self.weak,
        })
    }
}

impl ScheduleStore for SqliteStore {
    fn load(&mut self) -> Result<HashMap<String, SchedulingRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, interval, repetitions, next_due, weak FROM schedule")?;
        let rows = stmt
            .query_map([], |row| {
                let key: String = row.get(0)?;
                let raw = RawRecord {
                    interval: row.get(1)?,
                    repetitions: row.get(2)?,
                    next_due: row.get(3)?,
                    weak: row.get(4)?,
                };
                Ok((key, raw))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(key, raw)| raw.into_record(&key).map(|record| (key, record)))
            .collect()
    }

    fn save(&mut self, key: &str, record: &SchedulingRecord) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO schedule (key, interval, repetitions, next_due, weak, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(key) DO UPDATE SET
                interval = excluded.interval,
                repetitions = excluded.repetitions,
                next_due = excluded.next_due,
                weak = excluded.weak,
                updated_at = excluded.updated_at",
            params![
                key,
                record.interval,
                record.repetitions,
                format_date(record.next_due),
                record.weak,
                now
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::SCHEMA_VERSION;
    use pretty_assertions::assert_eq;

    fn record(interval: u32, weak: bool) -> SchedulingRecord {
        SchedulingRecord {
            interval,
            repetitions: if weak { 0 } else { 2 },
            next_due: NaiveDate::from_ymd_opt(2024, 5, 13).unwrap(),
            weak,
        }
    }

    #[test]
    fn test_save_and_load() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.save("毎朝パンを食べます", &record(3, false)).unwrap();
        store.save("雨", &record(0, true)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["毎朝パンを食べます"], record(3, false));
        assert_eq!(loaded["雨"], record(0, true));
    }

    #[test]
    fn test_save_overwrites() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.save("雨", &record(0, true)).unwrap();
        store.save("雨", &record(6, false)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["雨"], record(6, false));
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        let version: i32 = store
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_bad_date_is_invalid_data() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO schedule (key, next_due, updated_at) VALUES ('x', 'soon', 'now')",
                [],
            )
            .unwrap();
        assert!(matches!(store.load(), Err(StoreError::InvalidData(_))));
    }
}
