//! Core drill engine shared by the session app and its stores.
//!
//! Provides:
//! - Corpus loading (sentence rows, vocab lists, synonym groups)
//! - Growth-based interval scheduling and the scheduling table
//! - Tiered next-item selection (due, weak, new, random)
//! - Modality assignment, option sets and reorder segments
//! - Answer evaluation with kana readings as the common baseline

pub mod algorithm;
pub mod distractors;
pub mod error;
pub mod matching;
pub mod modality;
pub mod parser;
pub mod question;
pub mod reading;
pub mod schedule;
pub mod selector;
pub mod types;

pub use algorithm::{Growth, SchedulingResult, SpacedRepetitionAlgorithm};
pub use distractors::{build_options, ChoiceSet};
pub use error::{DataError, EngineError, Result};
pub use matching::{char_diff, evaluate, DiffSegment, DiffType, Evaluation};
pub use modality::{Comparison, Modality};
pub use parser::{load, Corpus, CorpusRow, GroupIndex};
pub use question::{prepare, Question, Segment};
pub use reading::{DictionaryKind, LexiconReader, MorphologicalReader, Reader};
pub use schedule::SchedulingTable;
pub use selector::{select_next, Selection, Tier};
pub use types::{EngineSettings, LearningItem, SchedulingRecord, SentenceItem, VocabItem};
