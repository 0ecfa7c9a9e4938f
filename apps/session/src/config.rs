//! Runtime configuration read from the environment (and `.env`).

use drill_core::{DictionaryKind, EngineSettings};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_SPEECH_TIMEOUT_SECS: u64 = 15;

/// Where the corpus rows come from.
#[derive(Debug, Clone, PartialEq)]
pub enum CorpusLocation {
    /// Local CSV file.
    Csv(PathBuf),
    /// Remote sheet service; also used as the schedule store.
    Sheet(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub corpus: Option<CorpusLocation>,
    pub db_path: PathBuf,
    pub engine: EngineSettings,
    /// Hour of day (0-23) when a new study day begins.
    pub daily_reset_hour: u32,
    pub tts_url: Option<String>,
    pub stt_url: Option<String>,
    pub speech_timeout: Duration,
    /// Compiled vibrato system dictionary used to read kana.
    pub dictionary: Option<PathBuf>,
    pub dictionary_kind: DictionaryKind,
}

impl Config {
    /// Read `DRILL_*` variables from the process environment.
    ///
    /// Load `.env` and install logging first, so fallback warnings are not lost.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let corpus = match (var("DRILL_SHEET_URL"), var("DRILL_CORPUS")) {
            (Some(url), _) => Some(CorpusLocation::Sheet(url)),
            (None, Some(path)) => Some(CorpusLocation::Csv(PathBuf::from(path))),
            (None, None) => None,
        };

        let defaults = EngineSettings::default();
        let engine = EngineSettings {
            growth_factor: parse_or("DRILL_GROWTH_FACTOR", var("DRILL_GROWTH_FACTOR"), defaults.growth_factor),
            weak_probability: parse_or(
                "DRILL_WEAK_PROBABILITY",
                var("DRILL_WEAK_PROBABILITY"),
                defaults.weak_probability,
            ),
            voice: var("DRILL_VOICE").unwrap_or(defaults.voice),
            ..defaults
        };

        let mut daily_reset_hour = parse_or("DRILL_DAILY_RESET_HOUR", var("DRILL_DAILY_RESET_HOUR"), 0u32);
        if daily_reset_hour > 23 {
            tracing::warn!(value = daily_reset_hour, "DRILL_DAILY_RESET_HOUR out of range, using 0");
            daily_reset_hour = 0;
        }

        Self {
            corpus,
            db_path: var("DRILL_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            engine,
            daily_reset_hour,
            tts_url: var("DRILL_TTS_URL"),
            stt_url: var("DRILL_STT_URL"),
            speech_timeout: Duration::from_secs(parse_or(
                "DRILL_SPEECH_TIMEOUT_SECS",
                var("DRILL_SPEECH_TIMEOUT_SECS"),
                DEFAULT_SPEECH_TIMEOUT_SECS,
            )),
            dictionary: var("DRILL_DICT_PATH").map(PathBuf::from),
            dictionary_kind: parse_or("DRILL_DICT_KIND", var("DRILL_DICT_KIND"), DictionaryKind::default()),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("drill-session")
        .join("schedule.db")
}

fn parse_or<T: FromStr>(name: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, "unparseable value, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.corpus, None);
        assert_eq!(config.engine, EngineSettings::default());
        assert_eq!(config.daily_reset_hour, 0);
        assert_eq!(config.speech_timeout, Duration::from_secs(15));
        assert!(config.db_path.ends_with("drill-session/schedule.db"));
        assert_eq!(config.dictionary, None);
        assert_eq!(config.dictionary_kind, DictionaryKind::Unidic);
    }

    #[test]
    fn test_dictionary_settings() {
        let config = config(&[("DRILL_DICT_PATH", "dict/system.dic"), ("DRILL_DICT_KIND", "ipadic")]);
        assert_eq!(config.dictionary, Some(PathBuf::from("dict/system.dic")));
        assert_eq!(config.dictionary_kind, DictionaryKind::Ipadic);

        let config = self::config(&[("DRILL_DICT_KIND", "juman")]);
        assert_eq!(config.dictionary_kind, DictionaryKind::Unidic);
    }

    #[test]
    fn test_sheet_url_takes_precedence() {
        let config = config(&[
            ("DRILL_CORPUS", "corpus.csv"),
            ("DRILL_SHEET_URL", "http://sheet.local/api"),
        ]);
        assert_eq!(
            config.corpus,
            Some(CorpusLocation::Sheet("http://sheet.local/api".to_string()))
        );

        let config = self::config(&[("DRILL_CORPUS", " corpus.csv ")]);
        assert_eq!(config.corpus, Some(CorpusLocation::Csv(PathBuf::from("corpus.csv"))));
    }

    #[test]
    fn test_engine_overrides() {
        let config = config(&[
            ("DRILL_GROWTH_FACTOR", "2.5"),
            ("DRILL_WEAK_PROBABILITY", "0.3"),
            ("DRILL_VOICE", "ja-JP-NanamiNeural"),
            ("DRILL_DAILY_RESET_HOUR", "4"),
        ]);
        assert_eq!(config.engine.growth_factor, 2.5);
        assert_eq!(config.engine.weak_probability, 0.3);
        assert_eq!(config.engine.voice, "ja-JP-NanamiNeural");
        assert_eq!(config.daily_reset_hour, 4);
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = config(&[
            ("DRILL_GROWTH_FACTOR", "fast"),
            ("DRILL_DAILY_RESET_HOUR", "25"),
            ("DRILL_SPEECH_TIMEOUT_SECS", "-1"),
        ]);
        assert_eq!(config.engine.growth_factor, 2.2);
        assert_eq!(config.daily_reset_hour, 0);
        assert_eq!(config.speech_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_fallback_warnings_are_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            config(&[("DRILL_GROWTH_FACTOR", "fast"), ("DRILL_DAILY_RESET_HOUR", "25")])
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("DRILL_GROWTH_FACTOR"));
        assert!(output.contains("DRILL_DAILY_RESET_HOUR out of range"));
    }
}
