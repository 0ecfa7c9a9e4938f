//! Fixed-step interval growth.
//!
//! New or failed items come back after 1 day, then 3 days, then the previous
//! interval times a growth factor (rounded down). Any miss resets to 0.

use super::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::types::SchedulingRecord;
use chrono::NaiveDate;

/// Interval growth with a configurable multiplier.
#[derive(Debug, Clone)]
pub struct Growth {
    pub first_interval: u32,
    pub second_interval: u32,
    pub growth_factor: f64,
}

impl Default for Growth {
    fn default() -> Self {
        Self {
            first_interval: 1,
            second_interval: 3,
            growth_factor: 2.2,
        }
    }
}

impl Growth {
    pub fn with_factor(growth_factor: f64) -> Self {
        Self {
            growth_factor,
            ..Default::default()
        }
    }

    /// Interval after a correct answer.
    pub fn next_interval(&self, interval: u32) -> u32 {
        match interval {
            0 => self.first_interval,
            1 => self.second_interval,
            n => {
                let grown = (f64::from(n) * self.growth_factor).floor();
                // A factor below 1 must not shrink a mature interval to zero.
                if grown.is_finite() && grown >= 1.0 {
                    grown.min(f64::from(u32::MAX)) as u32
                } else {
                    n
                }
            }
        }
    }
}

impl SpacedRepetitionAlgorithm for Growth {
    fn name(&self) -> &'static str {
        "growth"
    }

    fn schedule(&self, record: &SchedulingRecord, correct: bool, today: NaiveDate) -> SchedulingResult {
        let new_record = if correct {
            let interval = self.next_interval(record.interval);
            SchedulingRecord {
                interval,
                repetitions: record.repetitions.saturating_add(1),
                next_due: SchedulingRecord::due_after(today, interval),
                weak: false,
            }
        } else {
            SchedulingRecord {
                interval: 0,
                repetitions: 0,
                next_due: today,
                weak: true,
            }
        };

        SchedulingResult {
            next_due: new_record.next_due,
            new_record,
        }
    }
}
