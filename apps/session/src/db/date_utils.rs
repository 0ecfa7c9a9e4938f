//! Date utilities for daily reset hour handling.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};

/// Study day for a given local time.
///
/// Before the reset hour, "today" is still yesterday from a study perspective, so
/// late-night sessions count towards the previous day.
pub fn study_day(now: NaiveDateTime, daily_reset_hour: u32) -> NaiveDate {
    if now.hour() < daily_reset_hour {
        (now - Duration::days(1)).date()
    } else {
        now.date()
    }
}

/// Current study day on the local clock.
pub fn today(daily_reset_hour: u32) -> NaiveDate {
    study_day(Local::now().naive_local(), daily_reset_hour)
}
