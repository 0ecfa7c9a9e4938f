//! A selected item turned into a concrete question.

use crate::distractors::{build_options, ChoiceSet};
use crate::modality::{self, Modality};
use crate::parser::Corpus;
use crate::selector::{Selection, Tier};
use crate::types::{EngineSettings, LearningItem};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One block of a sentence to reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Position of the block in the original sentence.
    pub id: usize,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub item: LearningItem,
    pub modality: Modality,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<ChoiceSet>,
    /// Shuffled blocks, only for the reorder drill.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<Segment>,
    /// Synthesized prompt, filled in by the caller for listening and speaking drills.
    #[serde(skip)]
    pub prompt_audio: Option<Vec<u8>>,
}

impl Question {
    pub fn key(&self) -> &str {
        self.item.key()
    }

    /// Sentence rebuilt from segment ids in the order the learner picked them.
    /// Unknown ids are ignored.
    pub fn assemble(&self, order: &[usize]) -> String {
        order
            .iter()
            .filter_map(|id| self.segments.iter().find(|s| s.id == *id))
            .map(|s| s.text.as_str())
            .collect()
    }
}

/// Assign a modality to the selected item and build what it needs.
pub fn prepare<R: Rng + ?Sized>(
    selection: Selection,
    corpus: &Corpus,
    settings: &EngineSettings,
    rng: &mut R,
) -> Question {
    let Selection { item, tier, .. } = selection;
    let modality = modality::assign(&item, &corpus.groups, rng);
    let choices = build_options(&item, modality, corpus, settings.max_distractors, rng);

    let segments = match (&item, modality) {
        (LearningItem::Sentence(s), Modality::ReorderSegments) => {
            let mut segments: Vec<Segment> = s
                .segments
                .iter()
                .enumerate()
                .map(|(id, text)| Segment {
                    id,
                    text: text.clone(),
                })
                .collect();
            segments.shuffle(rng);
            segments
        }
        _ => Vec::new(),
    };

    Question {
        item,
        modality,
        tier,
        choices,
        segments,
        prompt_audio: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{load, CorpusRow};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corpus() -> Corpus {
        let rows: Vec<CorpusRow> = ["毎朝+パンを+食べます", "雨+です", "本を+読みます"]
            .iter()
            .map(|parsing| CorpusRow {
                sentence: parsing.replace('+', ""),
                translation: format!("{parsing}-t"),
                parsing: parsing.to_string(),
                ..Default::default()
            })
            .collect();
        load(&rows, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()).unwrap()
    }

    #[test]
    fn reorder_questions_carry_all_segments() {
        let corpus = corpus();
        let mut rng = StdRng::seed_from_u64(21);
        let mut reorder_seen = false;

        for _ in 0..200 {
            let selection = Selection {
                item: corpus.items[0].clone(),
                tier: Tier::New,
                evicted: Vec::new(),
            };
            let question = prepare(selection, &corpus, &EngineSettings::default(), &mut rng);
            if question.modality == Modality::ReorderSegments {
                reorder_seen = true;
                assert_eq!(question.segments.len(), 3);
                assert_eq!(question.assemble(&[0, 1, 2]), "毎朝パンを食べます");
                assert!(question.choices.is_none());
            } else {
                assert!(question.segments.is_empty());
            }
            assert_eq!(question.choices.is_some(), question.modality.is_choice());
        }

        assert!(reorder_seen);
    }

    #[test]
    fn assemble_ignores_unknown_ids() {
        let question = Question {
            item: corpus().items[1].clone(),
            modality: Modality::ReorderSegments,
            tier: Tier::Due,
            choices: None,
            segments: vec![
                Segment { id: 1, text: "です".into() },
                Segment { id: 0, text: "雨".into() },
            ],
            prompt_audio: None,
        };
        assert_eq!(question.assemble(&[1, 0, 7]), "です雨");
    }
}
