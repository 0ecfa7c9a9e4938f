//! Core types for the drill engine.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A sentence drilled as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceItem {
    pub sentence: String,
    pub translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Never empty: falls back to the whole sentence.
    pub segments: Vec<String>,
    pub activation_date: NaiveDate,
    /// Zero-based index of the corpus row the item came from.
    pub row: usize,
}

/// A single vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabItem {
    pub kanji: String,
    pub reading: String,
    pub meaning: String,
    pub activation_date: NaiveDate,
    pub row: usize,
}

/// Anything the learner can be asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LearningItem {
    Sentence(SentenceItem),
    Vocab(VocabItem),
}

impl LearningItem {
    /// Scheduling key: the sentence text or the kanji spelling.
    pub fn key(&self) -> &str {
        match self {
            Self::Sentence(s) => &s.sentence,
            Self::Vocab(v) => &v.kanji,
        }
    }

    pub fn activation_date(&self) -> NaiveDate {
        match self {
            Self::Sentence(s) => s.activation_date,
            Self::Vocab(v) => v.activation_date,
        }
    }

    pub fn row(&self) -> usize {
        match self {
            Self::Sentence(s) => s.row,
            Self::Vocab(v) => v.row,
        }
    }

    /// Text read aloud for audio prompts and playback.
    pub fn spoken_text(&self) -> &str {
        self.key()
    }

    pub fn as_sentence(&self) -> Option<&SentenceItem> {
        match self {
            Self::Sentence(s) => Some(s),
            Self::Vocab(_) => None,
        }
    }

    pub fn as_vocab(&self) -> Option<&VocabItem> {
        match self {
            Self::Vocab(v) => Some(v),
            Self::Sentence(_) => None,
        }
    }
}

/// Long-term memory state of one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingRecord {
    /// Days between the last update and the next review.
    pub interval: u32,
    pub repetitions: u32,
    pub next_due: NaiveDate,
    pub weak: bool,
}

impl SchedulingRecord {
    /// Record for a key seen for the first time.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            interval: 0,
            repetitions: 0,
            next_due: today,
            weak: false,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_due <= today
    }

    /// Due date for an interval counted from `today`.
    pub fn due_after(today: NaiveDate, interval: u32) -> NaiveDate {
        today + Duration::days(i64::from(interval))
    }
}

/// Tunable engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Interval multiplier once an item has passed the 1 and 3 day steps.
    pub growth_factor: f64,
    /// Chance of drilling a weak item when nothing is due.
    pub weak_probability: f64,
    pub max_distractors: usize,
    /// Voice id handed to the speech synthesizer.
    pub voice: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            growth_factor: 2.2,
            weak_probability: 0.7,
            max_distractors: 3,
            voice: "ja-JP-KeitaNeural".to_string(),
        }
    }
}

impl EngineSettings {
    /// Weak probability clamped to a valid probability.
    pub fn weak_chance(&self) -> f64 {
        if self.weak_probability.is_nan() {
            0.0
        } else {
            self.weak_probability.clamp(0.0, 1.0)
        }
    }
}
