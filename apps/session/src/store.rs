//! Persistence and corpus source interfaces.

use crate::error::StoreError;
use drill_core::{CorpusRow, SchedulingRecord};
use std::collections::HashMap;

type Result<T> = std::result::Result<T, StoreError>;

/// Durable home of the scheduling records.
pub trait ScheduleStore {
    /// Every stored record, keyed by item key.
    fn load(&mut self) -> Result<HashMap<String, SchedulingRecord>>;

    /// Write one record. The last write for a key wins.
    fn save(&mut self, key: &str, record: &SchedulingRecord) -> Result<()>;
}

/// Provider of raw corpus rows.
pub trait CorpusSource {
    fn fetch_rows(&mut self) -> Result<Vec<CorpusRow>>;
}

/// In-process store for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<String, SchedulingRecord>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: HashMap<String, SchedulingRecord>) -> Self {
        Self { records, writes: 0 }
    }

    pub fn get(&self, key: &str) -> Option<&SchedulingRecord> {
        self.records.get(key)
    }

    /// Number of `save` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ScheduleStore for MemoryStore {
    fn load(&mut self) -> Result<HashMap<String, SchedulingRecord>> {
        Ok(self.records.clone())
    }

    fn save(&mut self, key: &str, record: &SchedulingRecord) -> Result<()> {
        self.records.insert(key.to_string(), record.clone());
        self.writes += 1;
        Ok(())
    }
}

impl<S: ScheduleStore + ?Sized> ScheduleStore for Box<S> {
    fn load(&mut self) -> Result<HashMap<String, SchedulingRecord>> {
        (**self).load()
    }

    fn save(&mut self, key: &str, record: &SchedulingRecord) -> Result<()> {
        (**self).save(key, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_memory_store_last_write_wins() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let mut store = MemoryStore::new();
        let mut record = SchedulingRecord::new(today);
        store.save("雨", &record).unwrap();
        record.weak = true;
        store.save("雨", &record).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded["雨"].weak);
        assert_eq!(store.writes(), 2);
    }
}
