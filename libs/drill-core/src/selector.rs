//! Next-item selection.
//!
//! Candidate pools are tried in order: due reviews, weak items (with a configurable
//! probability), newly activated items, then the whole corpus. A non-empty due pool
//! always wins, so reviews are never starved by new material.

use crate::error::{EngineError, Result};
use crate::parser::Corpus;
use crate::schedule::SchedulingTable;
use crate::types::{EngineSettings, LearningItem, SchedulingRecord};
use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which pool an item was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Due,
    Weak,
    New,
    Random,
}

/// Outcome of a selection.
#[derive(Debug, Clone)]
pub struct Selection {
    pub item: LearningItem,
    pub tier: Tier,
    /// Mistake keys dropped because they no longer resolve to an item, with their
    /// updated records.
    pub evicted: Vec<(String, SchedulingRecord)>,
}

/// Items whose record is due on or before `today`.
pub fn due_items<'a>(
    corpus: &'a Corpus,
    table: &SchedulingTable,
    today: NaiveDate,
) -> Vec<&'a LearningItem> {
    corpus
        .items
        .iter()
        .filter(|item| table.get(item.key()).is_some_and(|r| r.is_due(today)))
        .collect()
}

/// Items never answered whose activation date has arrived.
pub fn new_items<'a>(
    corpus: &'a Corpus,
    table: &SchedulingTable,
    today: NaiveDate,
) -> Vec<&'a LearningItem> {
    corpus
        .items
        .iter()
        .filter(|item| !table.contains(item.key()) && item.activation_date() <= today)
        .collect()
}

/// Pick the next item to drill.
pub fn select_next<R: Rng + ?Sized>(
    corpus: &Corpus,
    table: &mut SchedulingTable,
    today: NaiveDate,
    settings: &EngineSettings,
    rng: &mut R,
) -> Result<Selection> {
    let mut evicted = Vec::new();

    loop {
        if let Some(item) = due_items(corpus, table, today).choose(rng) {
            return Ok(Selection {
                item: (*item).clone(),
                tier: Tier::Due,
                evicted,
            });
        }

        let weak_key = {
            let mistakes = table.mistakes();
            if !mistakes.is_empty() && rng.random_bool(settings.weak_chance()) {
                mistakes.choose(rng).map(|k| k.to_string())
            } else {
                None
            }
        };

        if let Some(key) = weak_key {
            match corpus.resolve(&key) {
                Ok(item) => {
                    return Ok(Selection {
                        item: item.clone(),
                        tier: Tier::Weak,
                        evicted,
                    })
                }
                Err(_) => {
                    if let Some(record) = table.evict(&key) {
                        evicted.push((key, record));
                    }
                    continue;
                }
            }
        }

        if let Some(item) = new_items(corpus, table, today).choose(rng) {
            return Ok(Selection {
                item: (*item).clone(),
                tier: Tier::New,
                evicted,
            });
        }

        return match corpus.items.choose(rng) {
            Some(item) => Ok(Selection {
                item: item.clone(),
                tier: Tier::Random,
                evicted,
            }),
            None => Err(EngineError::EmptyCorpus),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Growth;
    use crate::parser::{load, CorpusRow};
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn corpus(keys: &[(&str, &str)]) -> Corpus {
        let rows: Vec<CorpusRow> = keys
            .iter()
            .map(|(sentence, time)| CorpusRow {
                sentence: sentence.to_string(),
                translation: format!("{sentence}-t"),
                time: time.to_string(),
                ..Default::default()
            })
            .collect();
        load(&rows, today()).unwrap()
    }

    fn record(next_due: NaiveDate, weak: bool) -> SchedulingRecord {
        SchedulingRecord {
            interval: if weak { 0 } else { 3 },
            repetitions: if weak { 0 } else { 2 },
            next_due,
            weak,
        }
    }

    #[test]
    fn due_pool_always_wins() {
        let corpus = corpus(&[("due", "2024-01-01"), ("fresh", "2024-01-01"), ("later", "2024-01-01")]);
        let mut table: SchedulingTable = [
            ("due".to_string(), record(today(), false)),
            ("later".to_string(), record(today() + Duration::days(5), true)),
        ]
        .into_iter()
        .collect();
        let settings = EngineSettings {
            weak_probability: 1.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let selection = select_next(&corpus, &mut table, today(), &settings, &mut rng).unwrap();
            assert_eq!(selection.tier, Tier::Due);
            assert_eq!(selection.item.key(), "due");
        }
    }

    #[test]
    fn weak_pool_fires_when_probability_is_one() {
        let corpus = corpus(&[("weak", "2024-01-01"), ("fresh", "2024-01-01")]);
        let mut table: SchedulingTable =
            [("weak".to_string(), record(today() + Duration::days(1), true))]
                .into_iter()
                .collect();
        let settings = EngineSettings {
            weak_probability: 1.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let selection = select_next(&corpus, &mut table, today(), &settings, &mut rng).unwrap();
        assert_eq!(selection.tier, Tier::Weak);
        assert_eq!(selection.item.key(), "weak");
    }

    #[test]
    fn weak_pool_skipped_when_probability_is_zero() {
        let corpus = corpus(&[("weak", "2024-01-01"), ("fresh", "2024-01-01")]);
        let mut table: SchedulingTable =
            [("weak".to_string(), record(today() + Duration::days(1), true))]
                .into_iter()
                .collect();
        let settings = EngineSettings {
            weak_probability: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..50 {
            let selection = select_next(&corpus, &mut table, today(), &settings, &mut rng).unwrap();
            assert_eq!(selection.tier, Tier::New);
            assert_eq!(selection.item.key(), "fresh");
        }
    }

    #[test]
    fn orphan_mistake_is_evicted_and_selection_restarts() {
        let corpus = corpus(&[("fresh", "2024-01-01")]);
        let mut table: SchedulingTable =
            [("deleted".to_string(), record(today() + Duration::days(1), true))]
                .into_iter()
                .collect();
        let settings = EngineSettings {
            weak_probability: 1.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);

        let selection = select_next(&corpus, &mut table, today(), &settings, &mut rng).unwrap();
        assert_eq!(selection.tier, Tier::New);
        assert_eq!(selection.evicted.len(), 1);
        assert_eq!(selection.evicted[0].0, "deleted");
        assert!(table.mistakes().is_empty());
    }

    #[test]
    fn new_pool_respects_activation_date() {
        let corpus = corpus(&[("future", "2030-01-01"), ("active", "2024-05-10")]);
        let mut table = SchedulingTable::new();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let selection =
                select_next(&corpus, &mut table, today(), &EngineSettings::default(), &mut rng)
                    .unwrap();
            assert_eq!(selection.tier, Tier::New);
            assert_eq!(selection.item.key(), "active");
        }
    }

    #[test]
    fn falls_back_to_whole_corpus() {
        let corpus = corpus(&[("future", "2030-01-01"), ("mature", "2024-01-01")]);
        let mut table: SchedulingTable =
            [("mature".to_string(), record(today() + Duration::days(30), false))]
                .into_iter()
                .collect();
        let mut rng = StdRng::seed_from_u64(5);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let selection =
                select_next(&corpus, &mut table, today(), &EngineSettings::default(), &mut rng)
                    .unwrap();
            assert_eq!(selection.tier, Tier::Random);
            seen.insert(selection.item.key().to_string());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn empty_corpus_fails() {
        let corpus = Corpus::default();
        let mut table = SchedulingTable::new();
        let mut rng = StdRng::seed_from_u64(0);
        let err = select_next(&corpus, &mut table, today(), &EngineSettings::default(), &mut rng)
            .unwrap_err();
        assert_eq!(err, EngineError::EmptyCorpus);
    }

    #[test]
    fn answered_items_leave_the_new_pool() {
        let corpus = corpus(&[("a", "2024-01-01"), ("b", "2024-01-01")]);
        let mut table = SchedulingTable::new();
        table.record_answer("a", true, today(), &Growth::default());
        let fresh: Vec<_> = new_items(&corpus, &table, today())
            .into_iter()
            .map(|i| i.key())
            .collect();
        assert_eq!(fresh, vec!["b"]);
        assert!(due_items(&corpus, &table, today()).is_empty());
    }
}
