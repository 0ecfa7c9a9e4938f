//! Error types for stores, speech collaborators and the session.

use drill_core::EngineError;
use thiserror::Error;

/// Persistence and corpus source errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Speech synthesis and recognition failures.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech request timed out")]
    Timeout,

    #[error("speech request failed: {0}")]
    Http(String),

    #[error("speech backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("speech service not configured")]
    NotConfigured,
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SpeechError::Timeout
        } else {
            SpeechError::Http(err.to_string())
        }
    }
}

/// Errors surfaced by a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("no question pending for {0}")]
    NoPendingQuestion(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let error = StoreError::Remote {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(error.to_string(), "remote store returned 503: unavailable");
    }

    #[test]
    fn test_speech_error_display() {
        assert_eq!(SpeechError::Timeout.to_string(), "speech request timed out");
        let error = SpeechError::Backend {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(error.to_string(), "speech backend error: 500 - boom");
    }

    #[test]
    fn test_empty_corpus_is_transparent() {
        let error = SessionError::from(EngineError::EmptyCorpus);
        assert_eq!(error.to_string(), EngineError::EmptyCorpus.to_string());
    }

    #[test]
    fn test_no_pending_question_display() {
        let error = SessionError::NoPendingQuestion("雨".to_string());
        assert_eq!(error.to_string(), "no question pending for 雨");
    }
}
