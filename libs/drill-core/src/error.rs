//! Error types for drill-core.

use thiserror::Error;

/// Result type alias using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that end a selection or a load.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("corpus has no sentence or vocabulary items")]
    EmptyCorpus,

    #[error("key {0} does not resolve to any corpus item")]
    OrphanKey(String),

    #[error("failed to read morphological dictionary: {0}")]
    Dictionary(String),
}

/// Row-level problems found while loading a corpus.
///
/// These never abort a load: the offending row (or sub-entry) is skipped and the
/// error is kept on the corpus for the caller to report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("row {row}: {field} is empty")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: {vocab} vocabulary entries but {meanings} meanings")]
    VocabLengthMismatch {
        row: usize,
        vocab: usize,
        meanings: usize,
    },

    #[error("row {row}: unreadable date {value:?}, using today")]
    InvalidDate { row: usize, value: String },
}

impl DataError {
    /// Source row the problem was found on.
    pub fn row(&self) -> usize {
        match self {
            Self::MissingField { row, .. }
            | Self::VocabLengthMismatch { row, .. }
            | Self::InvalidDate { row, .. } => *row,
        }
    }
}
