pub mod config;
pub mod corpus;
pub mod db;
pub mod error;
pub mod logging;
pub mod session;
pub mod sheet;
pub mod speech;
pub mod store;

use anyhow::Context;

use crate::config::{Config, CorpusLocation};
use crate::corpus::CsvCorpus;
use crate::db::SqliteStore;
use crate::session::{load_corpus, open_reader, Session};
use crate::sheet::SheetStore;
use crate::speech::HttpSpeechClient;
use crate::store::ScheduleStore;

pub use error::{SessionError, SpeechError, StoreError};
pub use session::{AnswerOutcome, Explanation, SpokenOutcome, Stats};

/// Open the configured corpus and store, then report today's counts and the next question.
pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();
    let config = Config::from_env();

    let today = db::date_utils::today(config.daily_reset_hour);
    tracing::info!(%today, "starting session");

    let (corpus, store) = match &config.corpus {
        Some(CorpusLocation::Sheet(url)) => {
            let mut sheet = SheetStore::new(url, config.speech_timeout, today)
                .context("failed to build sheet client")?;
            let corpus = load_corpus(&mut sheet, today).context("failed to load corpus from sheet")?;
            (corpus, Box::new(sheet) as Box<dyn ScheduleStore>)
        }
        Some(CorpusLocation::Csv(path)) => {
            let mut source = CsvCorpus::new(path);
            let corpus = load_corpus(&mut source, today)
                .with_context(|| format!("failed to load corpus from {}", path.display()))?;
            tracing::info!(path = %config.db_path.display(), "opening schedule database");
            let store = SqliteStore::open(&config.db_path).context("failed to open schedule database")?;
            (corpus, Box::new(store) as Box<dyn ScheduleStore>)
        }
        None => anyhow::bail!("set DRILL_CORPUS or DRILL_SHEET_URL"),
    };

    let speech = HttpSpeechClient::new(
        config.tts_url.clone(),
        config.stt_url.clone(),
        config.speech_timeout,
    )
    .context("failed to build speech client")?;

    let reader = match &config.dictionary {
        Some(path) => Some(
            open_reader(path, config.dictionary_kind, &corpus)
                .with_context(|| format!("failed to open dictionary {}", path.display()))?,
        ),
        None => {
            tracing::warn!("DRILL_DICT_PATH not set, kana answers only read corpus vocabulary");
            None
        }
    };

    let mut session = Session::new(corpus, store, config.engine.clone(), today)?
        .with_speech(speech.clone(), speech);
    if let Some(reader) = reader {
        session = session.with_reader(reader);
    }

    println!("{}", serde_json::to_string(&session.stats())?);
    let question = session.select_next()?;
    println!("{}", serde_json::to_string(&question)?);
    Ok(())
}
