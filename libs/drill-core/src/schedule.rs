//! Per-key scheduling state and the update applied after each answer.
//!
//! The mistake set is never stored on its own: it is the set of keys whose record
//! has `weak == true`, so it cannot drift from the records.

use crate::algorithm::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::types::SchedulingRecord;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Scheduling records for every key seen so far.
#[derive(Debug, Clone, Default)]
pub struct SchedulingTable {
    records: HashMap<String, SchedulingRecord>,
}

impl SchedulingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&SchedulingRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchedulingRecord)> {
        self.records.iter().map(|(k, r)| (k.as_str(), r))
    }

    /// Keys flagged for priority review, sorted for stable output.
    pub fn mistakes(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .records
            .iter()
            .filter(|(_, r)| r.weak)
            .map(|(k, _)| k.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn is_weak(&self, key: &str) -> bool {
        self.records.get(key).is_some_and(|r| r.weak)
    }

    /// Apply an answer to `key`, creating its record on first encounter.
    pub fn record_answer(
        &mut self,
        key: &str,
        correct: bool,
        today: NaiveDate,
        algorithm: &dyn SpacedRepetitionAlgorithm,
    ) -> SchedulingResult {
        let record = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| algorithm.initial_record(today));
        let result = algorithm.schedule(record, correct, today);
        *record = result.new_record.clone();
        result
    }

    /// Drop a key from the mistake set because it no longer resolves to an item.
    ///
    /// Returns the updated record, or `None` when the key was not weak.
    pub fn evict(&mut self, key: &str) -> Option<SchedulingRecord> {
        let record = self.records.get_mut(key).filter(|r| r.weak)?;
        record.weak = false;
        Some(record.clone())
    }
}

impl FromIterator<(String, SchedulingRecord)> for SchedulingTable {
    fn from_iter<I: IntoIterator<Item = (String, SchedulingRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl From<HashMap<String, SchedulingRecord>> for SchedulingTable {
    fn from(records: HashMap<String, SchedulingRecord>) -> Self {
        Self { records }
    }
}
