//! Multiple-choice option sets.

use crate::modality::Modality;
use crate::parser::Corpus;
use crate::types::LearningItem;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Options shown for a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSet {
    /// The option the item is judged against.
    pub correct: String,
    /// Distractors plus the correct option, shuffled.
    pub options: Vec<String>,
}

/// Build the option set for a choice modality.
///
/// Returns `None` for modalities without options, and for the synonym drill when the
/// item has no other group member to offer.
pub fn build_options<R: Rng + ?Sized>(
    item: &LearningItem,
    modality: Modality,
    corpus: &Corpus,
    max_distractors: usize,
    rng: &mut R,
) -> Option<ChoiceSet> {
    let (correct, distractors) = match (modality, item) {
        (Modality::ChooseTranslation | Modality::ListenChooseTranslation, LearningItem::Sentence(s)) => {
            let pool = corpus.translation_pool.iter().map(String::as_str);
            let distractors = sample(pool, &s.translation, max_distractors, rng);
            (s.translation.clone(), distractors)
        }
        (Modality::ChooseSentence, LearningItem::Sentence(s)) => {
            let pool = corpus.sentences().map(|s| s.sentence.as_str());
            let distractors = sample(pool, &s.sentence, max_distractors, rng);
            (s.sentence.clone(), distractors)
        }
        (Modality::ListenChooseMeaning, LearningItem::Vocab(v)) => {
            let pool = corpus.meaning_pool.iter().map(String::as_str);
            let distractors = sample(pool, &v.meaning, max_distractors, rng);
            (v.meaning.clone(), distractors)
        }
        (Modality::ChooseSynonym, LearningItem::Sentence(s)) => {
            let group = s.group.as_deref()?;
            let siblings: Vec<&String> = corpus
                .groups
                .members(group)
                .iter()
                .filter(|m| **m != s.sentence)
                .collect();
            let correct = (*siblings.choose(rng)?).clone();
            let distractors = synonym_distractors(corpus, group, max_distractors, rng);
            (correct, distractors)
        }
        _ => return None,
    };

    let mut options = distractors;
    options.push(correct.clone());
    options.shuffle(rng);
    Some(ChoiceSet { correct, options })
}

/// Up to `max` distinct values from `pool`, never equal to `correct`.
fn sample<'a, R: Rng + ?Sized>(
    pool: impl Iterator<Item = &'a str>,
    correct: &str,
    max: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let candidates: Vec<&str> = pool
        .filter(|c| *c != correct && seen.insert(*c))
        .collect();
    candidates
        .choose_multiple(rng, max.min(candidates.len()))
        .map(|c| c.to_string())
        .collect()
}

/// Distractors for the synonym drill, drawn from other groups only.
///
/// With enough other groups, each distractor comes from a different group; otherwise
/// all other-group members are pooled.
fn synonym_distractors<R: Rng + ?Sized>(
    corpus: &Corpus,
    group: &str,
    max: usize,
    rng: &mut R,
) -> Vec<String> {
    let own = corpus.groups.members(group);
    let others: Vec<Vec<&str>> = corpus
        .groups
        .others(group)
        .map(|(_, members)| {
            members
                .iter()
                .map(String::as_str)
                .filter(|m| !own.iter().any(|o| o == m))
                .collect::<Vec<_>>()
        })
        .filter(|members| !members.is_empty())
        .collect();

    if others.len() >= max {
        let mut picked: Vec<String> = Vec::with_capacity(max);
        for members in others.choose_multiple(rng, others.len()) {
            if picked.len() == max {
                break;
            }
            let fresh: Vec<&&str> = members
                .iter()
                .filter(|m| !picked.iter().any(|p| p == **m))
                .collect();
            if let Some(member) = fresh.choose(rng) {
                picked.push(member.to_string());
            }
        }
        picked
    } else {
        let union = others.iter().flatten().copied();
        sample(union, "", max, rng)
    }
}
