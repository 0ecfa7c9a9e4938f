//! Spaced repetition algorithm implementations.

pub mod growth;

use crate::types::SchedulingRecord;
use chrono::NaiveDate;

pub use growth::Growth;

/// Result of scheduling a key after an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingResult {
    pub new_record: SchedulingRecord,
    pub next_due: NaiveDate,
}

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate the next record after a correct or incorrect answer given `today`.
    fn schedule(&self, record: &SchedulingRecord, correct: bool, today: NaiveDate) -> SchedulingResult;

    /// Record for a key that has never been answered.
    fn initial_record(&self, today: NaiveDate) -> SchedulingRecord {
        SchedulingRecord::new(today)
    }
}
