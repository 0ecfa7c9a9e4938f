//! Corpus loading: tabular rows into typed learning items.
//!
//! # Row format
//! | Sentence | Translation | Group | Parsing | Vocab List | Meaning | Time |
//! |----------|-------------|-------|---------|------------|---------|------|
//! | 毎朝パンを食べます | 我每天早上吃麵包 | g1 | 毎朝+パンを+食べます | 毎朝｜まいあさ。食べる｜たべる | 每天早上。吃 | 2024-03-01 |
//!
//! A row yields a sentence item when both sentence and translation are present, and
//! one vocabulary item per entry when the vocab and meaning lists have the same length.

use crate::error::{DataError, EngineError, Result};
use crate::types::{LearningItem, SentenceItem, VocabItem};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

const SEGMENT_DELIMITER: char = '+';
const WIDE_SEGMENT_DELIMITER: char = '＋';
const LIST_DELIMITER: char = '。';
const READING_SEPARATORS: [char; 2] = ['|', '｜'];

/// One raw corpus row, as read from a sheet or CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusRow {
    #[serde(rename = "Sentence")]
    pub sentence: String,
    #[serde(rename = "Translation")]
    pub translation: String,
    #[serde(rename = "Group")]
    pub group: String,
    #[serde(rename = "Parsing")]
    pub parsing: String,
    #[serde(rename = "Vocab List")]
    pub vocab: String,
    #[serde(rename = "Meaning")]
    pub meaning: String,
    #[serde(rename = "Time")]
    pub time: String,
}

/// Group id to its sentence keys, in first-seen order without duplicates.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: Vec<(String, Vec<String>)>,
    positions: HashMap<String, usize>,
}

impl GroupIndex {
    pub fn insert(&mut self, group: &str, key: &str) {
        let idx = match self.positions.get(group) {
            Some(&idx) => idx,
            None => {
                self.groups.push((group.to_string(), Vec::new()));
                self.positions.insert(group.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        let members = &mut self.groups[idx].1;
        if !members.iter().any(|m| m == key) {
            members.push(key.to_string());
        }
    }

    pub fn members(&self, group: &str) -> &[String] {
        self.positions
            .get(group)
            .map(|&idx| self.groups[idx].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, group: &str, key: &str) -> bool {
        self.members(group).iter().any(|m| m == key)
    }

    /// Whether the synonym drill can be built for this group.
    pub fn is_eligible(&self, group: &str) -> bool {
        self.members(group).len() >= 2
    }

    /// Every group except `group`, in first-seen order.
    pub fn others<'a>(&'a self, group: &'a str) -> impl Iterator<Item = (&'a str, &'a [String])> + 'a {
        self.groups
            .iter()
            .filter(move |(id, _)| id != group)
            .map(|(id, members)| (id.as_str(), members.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Everything loaded for a session.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Sentence items first, then vocabulary items, each in row order.
    pub items: Vec<LearningItem>,
    pub groups: GroupIndex,
    /// Distinct sentence translations, for distractors.
    pub translation_pool: Vec<String>,
    /// Distinct vocabulary meanings, for distractors.
    pub meaning_pool: Vec<String>,
    /// Rows or entries that were skipped while loading.
    pub skipped: Vec<DataError>,
    index: HashMap<String, usize>,
}

impl Corpus {
    /// Resolve a scheduling key. With duplicate keys the later row wins.
    pub fn get(&self, key: &str) -> Option<&LearningItem> {
        self.index.get(key).map(|&idx| &self.items[idx])
    }

    /// Like [`Corpus::get`], failing with [`EngineError::OrphanKey`] for unknown keys.
    pub fn resolve(&self, key: &str) -> Result<&LearningItem> {
        self.get(key)
            .ok_or_else(|| EngineError::OrphanKey(key.to_string()))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn sentences(&self) -> impl Iterator<Item = &SentenceItem> {
        self.items.iter().filter_map(LearningItem::as_sentence)
    }

    pub fn vocab(&self) -> impl Iterator<Item = &VocabItem> {
        self.items.iter().filter_map(LearningItem::as_vocab)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Serialize the items back into rows, one per source row.
    pub fn to_rows(&self) -> Vec<CorpusRow> {
        let mut rows: BTreeMap<usize, CorpusRow> = BTreeMap::new();
        let mut vocab: BTreeMap<usize, Vec<&VocabItem>> = BTreeMap::new();

        for item in &self.items {
            match item {
                LearningItem::Sentence(s) => {
                    let row = rows.entry(s.row).or_default();
                    row.sentence = s.sentence.clone();
                    row.translation = s.translation.clone();
                    row.group = s.group.clone().unwrap_or_default();
                    row.parsing = if s.segments.len() == 1 && s.segments[0] == s.sentence {
                        String::new()
                    } else {
                        s.segments.join("+")
                    };
                    row.time = format_date(s.activation_date);
                }
                LearningItem::Vocab(v) => vocab.entry(v.row).or_default().push(v),
            }
        }

        for (idx, entries) in vocab {
            let row = rows.entry(idx).or_default();
            row.vocab = entries
                .iter()
                .map(|v| {
                    if v.reading == v.kanji {
                        v.kanji.clone()
                    } else {
                        format!("{}|{}", v.kanji, v.reading)
                    }
                })
                .collect::<Vec<_>>()
                .join("。");
            row.meaning = entries
                .iter()
                .map(|v| v.meaning.as_str())
                .collect::<Vec<_>>()
                .join("。");
            if row.time.is_empty() {
                row.time = format_date(entries[0].activation_date);
            }
        }

        rows.into_values().collect()
    }
}

/// Load corpus rows into items, pools and the group index.
///
/// Malformed rows are skipped and listed in [`Corpus::skipped`]; the load only fails
/// when nothing at all could be loaded.
pub fn load(rows: &[CorpusRow], today: NaiveDate) -> Result<Corpus> {
    let mut sentences = Vec::new();
    let mut vocab = Vec::new();
    let mut corpus = Corpus::default();

    for (idx, raw) in rows.iter().enumerate() {
        let row = RowFields::trimmed(raw);
        let activation_date = match parse_date(row.time) {
            Ok(Some(date)) => date,
            Ok(None) => today,
            Err(()) => {
                corpus.skipped.push(DataError::InvalidDate {
                    row: idx,
                    value: row.time.to_string(),
                });
                today
            }
        };

        match (row.sentence.is_empty(), row.translation.is_empty()) {
            (false, false) => {
                let group = (!row.group.is_empty()).then(|| row.group.to_string());
                if let Some(group) = &group {
                    corpus.groups.insert(group, row.sentence);
                }
                sentences.push(SentenceItem {
                    sentence: row.sentence.to_string(),
                    translation: row.translation.to_string(),
                    group,
                    segments: split_segments(row.parsing, row.sentence),
                    activation_date,
                    row: idx,
                });
            }
            (false, true) => corpus.skipped.push(DataError::MissingField {
                row: idx,
                field: "translation",
            }),
            (true, false) => corpus.skipped.push(DataError::MissingField {
                row: idx,
                field: "sentence",
            }),
            (true, true) => {}
        }

        match (row.vocab.is_empty(), row.meaning.is_empty()) {
            (false, false) => match split_vocab(row.vocab, row.meaning, activation_date, idx) {
                Ok(entries) => vocab.extend(entries),
                Err(err) => corpus.skipped.push(err),
            },
            (false, true) => corpus.skipped.push(DataError::MissingField {
                row: idx,
                field: "meaning",
            }),
            (true, false) => corpus.skipped.push(DataError::MissingField {
                row: idx,
                field: "vocab list",
            }),
            (true, true) => {}
        }
    }

    if sentences.is_empty() && vocab.is_empty() {
        return Err(EngineError::EmptyCorpus);
    }

    corpus.translation_pool = distinct(sentences.iter().map(|s| s.translation.as_str()));
    corpus.meaning_pool = distinct(vocab.iter().map(|v| v.meaning.as_str()));
    corpus.items = sentences
        .into_iter()
        .map(LearningItem::Sentence)
        .chain(vocab.into_iter().map(LearningItem::Vocab))
        .collect();
    corpus.index = corpus
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| (item.key().to_string(), idx))
        .collect();

    Ok(corpus)
}

struct RowFields<'a> {
    sentence: &'a str,
    translation: &'a str,
    group: &'a str,
    parsing: &'a str,
    vocab: &'a str,
    meaning: &'a str,
    time: &'a str,
}

impl<'a> RowFields<'a> {
    fn trimmed(row: &'a CorpusRow) -> Self {
        Self {
            sentence: row.sentence.trim(),
            translation: row.translation.trim(),
            group: row.group.trim(),
            parsing: row.parsing.trim(),
            vocab: row.vocab.trim(),
            meaning: row.meaning.trim(),
            time: row.time.trim(),
        }
    }
}

/// Split a parsing expression into segments; never returns an empty list.
pub fn split_segments(parsing: &str, sentence: &str) -> Vec<String> {
    let normalized = parsing.replace(WIDE_SEGMENT_DELIMITER, "+");
    let segments: Vec<String> = normalized
        .split(SEGMENT_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if segments.is_empty() {
        vec![sentence.to_string()]
    } else {
        segments
    }
}

fn split_vocab(
    vocab: &str,
    meaning: &str,
    activation_date: NaiveDate,
    row: usize,
) -> std::result::Result<Vec<VocabItem>, DataError> {
    let entries = split_list(vocab);
    let meanings = split_list(meaning);

    if entries.len() != meanings.len() {
        return Err(DataError::VocabLengthMismatch {
            row,
            vocab: entries.len(),
            meanings: meanings.len(),
        });
    }

    Ok(entries
        .into_iter()
        .zip(meanings)
        .filter_map(|(entry, meaning)| {
            let (kanji, reading) = match entry.split_once(READING_SEPARATORS) {
                Some((kanji, reading)) => (kanji.trim(), reading.trim()),
                None => (entry, entry),
            };
            if kanji.is_empty() {
                return None;
            }
            let reading = if reading.is_empty() { kanji } else { reading };
            Some(VocabItem {
                kanji: kanji.to_string(),
                reading: reading.to_string(),
                meaning: meaning.to_string(),
                activation_date,
                row,
            })
        })
        .collect())
}

fn split_list(list: &str) -> Vec<&str> {
    list.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a corpus date. Empty input is `Ok(None)`.
pub fn parse_date(value: &str) -> std::result::Result<Option<NaiveDate>, ()> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(Some(date));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(dt.date_naive()));
    }
    // Sheet exports sometimes carry a time part: "2024-03-01 00:00:00".
    if let Some((date, _)) = value.split_once(' ') {
        if let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            return Ok(Some(date));
        }
    }
    Err(())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(String::from)
        .collect()
}
