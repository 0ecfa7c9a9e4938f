//! A drilling session: selection, answers and persistence around the core engine.

use crate::error::{Result, SessionError};
use crate::speech::{NoSpeech, Recognizer, Synthesizer, Transcript};
use crate::store::{CorpusSource, ScheduleStore};
use chrono::NaiveDate;
use drill_core::matching::{self, DiffSegment, Evaluation};
use drill_core::selector::{due_items, new_items};
use drill_core::{
    Corpus, DictionaryKind, EngineError, EngineSettings, Growth, LearningItem, LexiconReader,
    MorphologicalReader, Question, Reader, SchedulingRecord, SchedulingTable,
    SpacedRepetitionAlgorithm,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Feedback shown after an answer.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    /// The expected answer.
    pub target: String,
    pub item: LearningItem,
    pub next_due: NaiveDate,
    pub interval: u32,
    /// Only for wrong free-form answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<Vec<DiffSegment>>,
}

/// Result of recording an answer.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub evaluation: Evaluation,
    pub explanation: Explanation,
    /// Record after the update.
    pub record: SchedulingRecord,
    /// False when the store write failed; the in-memory record still stands.
    pub persisted: bool,
    /// The correct text, synthesized for playback when available.
    pub answer_audio: Option<Vec<u8>>,
}

/// Result of a spoken answer.
#[derive(Debug, Clone)]
pub enum SpokenOutcome {
    Answered(Box<AnswerOutcome>),
    /// Nothing usable was heard; the question stays pending and the schedule is untouched.
    NotRecognized,
}

/// Counts for the current study day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub due: usize,
    pub weak: usize,
    pub new: usize,
    pub total: usize,
}

/// Load rows from `source` into a corpus, logging skipped rows.
pub fn load_corpus(source: &mut dyn CorpusSource, today: NaiveDate) -> Result<Corpus> {
    let rows = source.fetch_rows()?;
    let corpus = drill_core::load(&rows, today)?;
    for skipped in &corpus.skipped {
        tracing::warn!(row = skipped.row(), "skipped corpus entry: {}", skipped);
    }
    tracing::info!(
        rows = rows.len(),
        items = corpus.len(),
        sentences = corpus.sentences().count(),
        vocab = corpus.vocab().count(),
        groups = corpus.groups.len(),
        "corpus loaded"
    );
    Ok(corpus)
}

/// Open a compiled vibrato dictionary at `path`.
///
/// Vocabulary readings from `corpus` take precedence over the analyzer.
pub fn open_reader(path: &Path, kind: DictionaryKind, corpus: &Corpus) -> Result<MorphologicalReader> {
    let file = File::open(path)
        .map_err(|e| EngineError::Dictionary(format!("{}: {e}", path.display())))?;
    let reader = MorphologicalReader::read(BufReader::new(file), kind)?;
    tracing::info!(path = %path.display(), ?kind, "dictionary loaded");
    Ok(reader.with_overrides(LexiconReader::from_corpus(corpus)))
}

pub struct Session<S: ScheduleStore> {
    corpus: Corpus,
    table: SchedulingTable,
    store: S,
    settings: EngineSettings,
    algorithm: Growth,
    reader: Box<dyn Reader>,
    synthesizer: Box<dyn Synthesizer>,
    recognizer: Box<dyn Recognizer>,
    rng: StdRng,
    today: NaiveDate,
    pending: Option<Question>,
}

impl<S: ScheduleStore> Session<S> {
    /// Start a session over `corpus`, reading existing records from `store`.
    pub fn new(corpus: Corpus, mut store: S, settings: EngineSettings, today: NaiveDate) -> Result<Self> {
        let table = SchedulingTable::from(store.load()?);
        let algorithm = Growth::with_factor(settings.growth_factor);
        tracing::info!(
            records = table.len(),
            weak = table.mistakes().len(),
            algorithm = algorithm.name(),
            "schedule loaded"
        );
        let orphans = table
            .iter()
            .filter(|(key, _)| !corpus.contains_key(key))
            .count();
        if orphans > 0 {
            tracing::debug!(orphans, "stored records without a corpus item");
        }

        Ok(Self {
            reader: Box::new(LexiconReader::from_corpus(&corpus)),
            algorithm,
            corpus,
            table,
            store,
            settings,
            synthesizer: Box::new(NoSpeech),
            recognizer: Box::new(NoSpeech),
            rng: StdRng::seed_from_u64(rand::random()),
            today,
            pending: None,
        })
    }

    pub fn with_speech<T, R>(mut self, synthesizer: T, recognizer: R) -> Self
    where
        T: Synthesizer + 'static,
        R: Recognizer + 'static,
    {
        self.synthesizer = Box::new(synthesizer);
        self.recognizer = Box::new(recognizer);
        self
    }

    pub fn with_reader<R: Reader + 'static>(mut self, reader: R) -> Self {
        self.reader = Box::new(reader);
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn table(&self) -> &SchedulingTable {
        &self.table
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Move to another study day, e.g. when a long session crosses the reset hour.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn pending(&self) -> Option<&Question> {
        self.pending.as_ref()
    }

    /// Pick the next item and turn it into a question.
    ///
    /// Fails only when the corpus is empty.
    pub fn select_next(&mut self) -> Result<Question> {
        let selection = drill_core::select_next(
            &self.corpus,
            &mut self.table,
            self.today,
            &self.settings,
            &mut self.rng,
        )?;

        for (key, record) in &selection.evicted {
            tracing::warn!(key = %key, "weak key no longer in corpus, evicted");
            self.persist(key, record);
        }

        let mut question = drill_core::prepare(selection, &self.corpus, &self.settings, &mut self.rng);
        if question.modality.has_audio_prompt() {
            question.prompt_audio = self.speak(question.item.spoken_text());
        }

        tracing::debug!(
            key = question.key(),
            tier = ?question.tier,
            modality = ?question.modality,
            "selected"
        );
        self.pending = Some(question.clone());
        Ok(question)
    }

    /// Judge `input` for the pending question on `key` and update its schedule.
    pub fn record_answer(&mut self, key: &str, input: &str) -> Result<AnswerOutcome> {
        let question = self.take_pending(key)?;
        Ok(self.apply_answer(&question, input))
    }

    /// Answer a reorder question with segment ids in the chosen order.
    pub fn submit_segments(&mut self, key: &str, order: &[usize]) -> Result<AnswerOutcome> {
        let question = self.take_pending(key)?;
        let input = question.assemble(order);
        Ok(self.apply_answer(&question, &input))
    }

    /// Transcribe recorded speech and judge it.
    ///
    /// Unrecognized speech and recognizer failures leave the question pending and the
    /// schedule untouched.
    pub fn record_spoken_answer(&mut self, key: &str, audio: &[u8]) -> Result<SpokenOutcome> {
        if !self.pending.as_ref().is_some_and(|q| q.key() == key) {
            return Err(SessionError::NoPendingQuestion(key.to_string()));
        }

        match self.recognizer.recognize(audio) {
            Ok(Transcript::Text(text)) => {
                let outcome = self.record_answer(key, &text)?;
                Ok(SpokenOutcome::Answered(Box::new(outcome)))
            }
            Ok(Transcript::Unrecognized) => {
                tracing::info!(key, "speech not recognized");
                Ok(SpokenOutcome::NotRecognized)
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "speech recognition failed");
                Ok(SpokenOutcome::NotRecognized)
            }
        }
    }

    /// Drop the pending question without touching the schedule.
    pub fn skip(&mut self) -> Option<Question> {
        self.pending.take()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            due: due_items(&self.corpus, &self.table, self.today).len(),
            weak: self
                .table
                .mistakes()
                .into_iter()
                .filter(|key| self.corpus.contains_key(key))
                .count(),
            new: new_items(&self.corpus, &self.table, self.today).len(),
            total: self.corpus.len(),
        }
    }

    fn take_pending(&mut self, key: &str) -> Result<Question> {
        match self.pending.take() {
            Some(question) if question.key() == key => Ok(question),
            other => {
                self.pending = other;
                Err(SessionError::NoPendingQuestion(key.to_string()))
            }
        }
    }

    fn apply_answer(&mut self, question: &Question, input: &str) -> AnswerOutcome {
        let key = question.key();
        let evaluation = matching::evaluate(
            &question.item,
            question.modality,
            input,
            &self.corpus.groups,
            self.reader.as_ref(),
        );
        let result = self
            .table
            .record_answer(key, evaluation.is_correct, self.today, &self.algorithm);
        let persisted = self.persist(key, &result.new_record);

        tracing::debug!(
            key,
            correct = evaluation.is_correct,
            interval = result.new_record.interval,
            "answer recorded"
        );

        let answer_audio = self.speak(&evaluation.target);
        AnswerOutcome {
            correct: evaluation.is_correct,
            explanation: Explanation {
                target: evaluation.target.clone(),
                item: question.item.clone(),
                next_due: result.next_due,
                interval: result.new_record.interval,
                diff: evaluation.diff.clone(),
            },
            evaluation,
            record: result.new_record,
            persisted,
            answer_audio,
        }
    }

    fn persist(&mut self, key: &str, record: &SchedulingRecord) -> bool {
        match self.store.save(key, record) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to persist schedule, keeping in-memory record");
                false
            }
        }
    }

    fn speak(&self, text: &str) -> Option<Vec<u8>> {
        match self.synthesizer.synthesize(text, &self.settings.voice) {
            Ok(audio) => Some(audio),
            Err(err) => {
                tracing::warn!(error = %err, "speech synthesis failed");
                None
            }
        }
    }
}
