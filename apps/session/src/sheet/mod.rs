//! Remote sheet service: corpus rows and scheduling columns over HTTP/JSON.
//!
//! `GET {base}/rows` returns every row as an object keyed by column header.
//! `PUT {base}/rows/{key}` writes the scheduling columns of the row holding `key`.

use crate::error::StoreError;
use crate::store::{CorpusSource, ScheduleStore};
use chrono::NaiveDate;
use drill_core::parser::{format_date, parse_date};
use drill_core::{CorpusRow, SchedulingRecord};
use reqwest::blocking::Client;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::time::Duration;

type Result<T> = std::result::Result<T, StoreError>;

/// One sheet row: corpus columns plus optional scheduling columns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetRow {
    #[serde(flatten)]
    pub corpus: CorpusRow,
    #[serde(rename = "Weak", default, deserialize_with = "lenient_bool")]
    pub weak: bool,
    #[serde(rename = "Next_Review", default, deserialize_with = "lenient_string")]
    pub next_review: String,
    #[serde(rename = "Interval", default, deserialize_with = "lenient_u32")]
    pub interval: Option<u32>,
    #[serde(rename = "Reps", default, deserialize_with = "lenient_u32")]
    pub reps: Option<u32>,
}

impl SheetRow {
    /// Scheduling state carried by this row, if any.
    ///
    /// A row carries state when it has a review date or is flagged weak; a weak row
    /// without a date is due on `today`.
    pub fn record(&self, today: NaiveDate) -> Option<SchedulingRecord> {
        let next_due = parse_date(&self.next_review).ok().flatten();
        if next_due.is_none() && !self.weak {
            return None;
        }
        Some(SchedulingRecord {
            interval: self.interval.unwrap_or(0),
            repetitions: self.reps.unwrap_or(0),
            next_due: next_due.unwrap_or(today),
            weak: self.weak,
        })
    }

    /// Item keys contributed by this row: the sentence, then each vocab spelling.
    pub fn keys(&self, today: NaiveDate) -> Vec<String> {
        drill_core::load(std::slice::from_ref(&self.corpus), today)
            .map(|corpus| corpus.items.iter().map(|i| i.key().to_string()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
struct RecordUpdate<'a> {
    #[serde(rename = "Weak")]
    weak: bool,
    #[serde(rename = "Next_Review")]
    next_review: &'a str,
    #[serde(rename = "Interval")]
    interval: u32,
    #[serde(rename = "Reps")]
    reps: u32,
}

/// Sheet-backed corpus source and schedule store.
///
/// `today` is the session's study day; weak rows without a review date are due on it.
pub struct SheetStore {
    client: Client,
    base_url: String,
    today: NaiveDate,
}

impl SheetStore {
    pub fn new(base_url: &str, timeout: Duration, today: NaiveDate) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            today,
        })
    }

    fn records(&self, rows: &[SheetRow]) -> HashMap<String, SchedulingRecord> {
        records_from_rows(rows, self.today)
    }

    /// Fetch all rows, including scheduling columns.
    pub fn rows(&self) -> Result<Vec<SheetRow>> {
        let url = format!("{}/rows", self.base_url);
        let resp = self.client.get(&url).send()?;
        let resp = check_status(resp)?;
        Ok(resp.json()?)
    }
}

fn check_status(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let message = resp.text().unwrap_or_default();
    Err(StoreError::Remote { status, message })
}

/// Scheduling records seeded from sheet rows; a later row wins for a shared key.
pub fn records_from_rows(rows: &[SheetRow], today: NaiveDate) -> HashMap<String, SchedulingRecord> {
    let mut records = HashMap::new();
    for row in rows {
        if let Some(record) = row.record(today) {
            for key in row.keys(today) {
                records.insert(key, record.clone());
            }
        }
    }
    records
}

impl CorpusSource for SheetStore {
    fn fetch_rows(&mut self) -> Result<Vec<CorpusRow>> {
        Ok(self.rows()?.into_iter().map(|r| r.corpus).collect())
    }
}

impl ScheduleStore for SheetStore {
    fn load(&mut self) -> Result<HashMap<String, SchedulingRecord>> {
        let rows = self.rows()?;
        Ok(self.records(&rows))
    }

    fn save(&mut self, key: &str, record: &SchedulingRecord) -> Result<()> {
        let url = format!("{}/rows/{}", self.base_url, urlencoding::encode(key));
        let next_review = format_date(record.next_due);
        let update = RecordUpdate {
            weak: record.weak,
            next_review: &next_review,
            interval: record.interval,
            reps: record.repetitions,
        };
        let resp = self.client.put(&url).json(&update).send()?;
        check_status(resp)?;
        Ok(())
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_u64().is_some_and(|n| n != 0),
        serde_json::Value::String(s) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
        }
        _ => false,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<u32>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
