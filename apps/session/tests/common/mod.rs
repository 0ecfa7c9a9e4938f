//! Common test utilities and fixtures for integration tests.
//!
//! Provides in-process fakes for the store and speech collaborators so sessions can
//! be driven end to end without network access.

#![allow(dead_code)]

pub mod fixtures;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use drill_core::{Corpus, EngineSettings, SchedulingRecord};
use drill_session::corpus::CsvCorpus;
use drill_session::error::{SpeechError, StoreError};
use drill_session::session::{load_corpus, Session};
use drill_session::speech::{Recognizer, Synthesizer, Transcript};
use drill_session::store::{MemoryStore, ScheduleStore};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Corpus loaded from [`fixtures::SAMPLE_CSV`] through the CSV source.
pub fn sample_corpus() -> Corpus {
    let file = fixtures::csv_file(fixtures::SAMPLE_CSV);
    let mut source = CsvCorpus::new(file.path());
    load_corpus(&mut source, fixtures::today()).unwrap()
}

/// Session over the sample corpus with a deterministic rng.
pub fn memory_session(store: MemoryStore, seed: u64) -> Session<MemoryStore> {
    Session::new(sample_corpus(), store, EngineSettings::default(), fixtures::today())
        .unwrap()
        .with_rng(StdRng::seed_from_u64(seed))
}

/// Store whose writes always fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    pub attempts: usize,
}

impl ScheduleStore for FailingStore {
    fn load(&mut self) -> Result<HashMap<String, SchedulingRecord>, StoreError> {
        Ok(HashMap::new())
    }

    fn save(&mut self, _key: &str, _record: &SchedulingRecord) -> Result<(), StoreError> {
        self.attempts += 1;
        Err(StoreError::InvalidData("disk full".to_string()))
    }
}

/// Scripted speech collaborator; clones share the same call log and script.
#[derive(Debug, Clone, Default)]
pub struct FakeSpeech {
    pub synthesized: Rc<RefCell<Vec<String>>>,
    pub transcripts: Rc<RefCell<Vec<Result<Transcript, ()>>>>,
    pub fail_synthesis: bool,
}

impl FakeSpeech {
    /// Queue the next recognition results, consumed front to back.
    pub fn hear(&self, results: Vec<Result<Transcript, ()>>) {
        self.transcripts.borrow_mut().extend(results);
    }
}

impl Synthesizer for FakeSpeech {
    fn synthesize(&self, text: &str, _voice: &str) -> Result<Vec<u8>, SpeechError> {
        self.synthesized.borrow_mut().push(text.to_string());
        if self.fail_synthesis {
            return Err(SpeechError::Timeout);
        }
        Ok(text.as_bytes().to_vec())
    }
}

impl Recognizer for FakeSpeech {
    fn recognize(&self, _audio: &[u8]) -> Result<Transcript, SpeechError> {
        let mut queue = self.transcripts.borrow_mut();
        if queue.is_empty() {
            return Ok(Transcript::Unrecognized);
        }
        queue.remove(0).map_err(|()| SpeechError::Timeout)
    }
}
