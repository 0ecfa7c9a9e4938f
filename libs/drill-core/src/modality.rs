//! Question modalities and how one is chosen for an item.

use crate::parser::GroupIndex;
use crate::types::LearningItem;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a question is presented and answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Sentence shown, pick its translation.
    ChooseTranslation,
    /// Translation shown, pick the sentence.
    ChooseSentence,
    /// Sentence played, pick its translation.
    ListenChooseTranslation,
    /// Sentence shown, pick another sentence from the same group.
    ChooseSynonym,
    /// Sentence played, type it.
    ListenTranscribe,
    /// Translation shown, put the shuffled segments back in order.
    ReorderSegments,
    /// Sentence shown, say it.
    SpeakSentence,
    /// Kanji shown, type the reading.
    RecallReading,
    /// Word played, pick its meaning.
    ListenChooseMeaning,
    /// Kanji shown, say it.
    SpeakKanji,
}

/// How a response is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Whitespace-insensitive, case-sensitive equality.
    Exact,
    /// Membership in the item's group.
    GroupMember,
    /// Equality of kana readings after dropping punctuation.
    Phonetic,
}

const SENTENCE_MODALITIES: [Modality; 6] = [
    Modality::ChooseTranslation,
    Modality::ChooseSentence,
    Modality::ListenChooseTranslation,
    Modality::ListenTranscribe,
    Modality::ReorderSegments,
    Modality::SpeakSentence,
];

const VOCAB_MODALITIES: [Modality; 3] = [
    Modality::RecallReading,
    Modality::ListenChooseMeaning,
    Modality::SpeakKanji,
];

impl Modality {
    pub fn comparison(self) -> Comparison {
        match self {
            Self::ChooseTranslation
            | Self::ChooseSentence
            | Self::ListenChooseTranslation
            | Self::ListenChooseMeaning => Comparison::Exact,
            Self::ChooseSynonym => Comparison::GroupMember,
            Self::ListenTranscribe
            | Self::ReorderSegments
            | Self::SpeakSentence
            | Self::RecallReading
            | Self::SpeakKanji => Comparison::Phonetic,
        }
    }

    /// Whether the learner picks from a list of options.
    pub fn is_choice(self) -> bool {
        matches!(
            self,
            Self::ChooseTranslation
                | Self::ChooseSentence
                | Self::ListenChooseTranslation
                | Self::ChooseSynonym
                | Self::ListenChooseMeaning
        )
    }

    /// Whether the prompt is played as audio.
    pub fn has_audio_prompt(self) -> bool {
        matches!(
            self,
            Self::ListenChooseTranslation
                | Self::ListenTranscribe
                | Self::ListenChooseMeaning
                | Self::SpeakSentence
                | Self::SpeakKanji
        )
    }

    /// Whether the answer arrives as recorded speech.
    pub fn is_spoken(self) -> bool {
        matches!(self, Self::SpeakSentence | Self::SpeakKanji)
    }

    pub fn is_vocab(self) -> bool {
        VOCAB_MODALITIES.contains(&self)
    }
}

/// Modalities that can be asked about `item`.
pub fn eligible(item: &LearningItem, groups: &GroupIndex) -> Vec<Modality> {
    match item {
        LearningItem::Sentence(sentence) => {
            let mut modalities = SENTENCE_MODALITIES.to_vec();
            if sentence
                .group
                .as_deref()
                .is_some_and(|g| groups.is_eligible(g))
            {
                modalities.push(Modality::ChooseSynonym);
            }
            modalities
        }
        LearningItem::Vocab(_) => VOCAB_MODALITIES.to_vec(),
    }
}

/// Choose a modality uniformly among the eligible ones.
pub fn assign<R: Rng + ?Sized>(item: &LearningItem, groups: &GroupIndex, rng: &mut R) -> Modality {
    let fallback = match item {
        LearningItem::Sentence(_) => SENTENCE_MODALITIES[0],
        LearningItem::Vocab(_) => VOCAB_MODALITIES[0],
    };
    eligible(item, groups).choose(rng).copied().unwrap_or(fallback)
}
