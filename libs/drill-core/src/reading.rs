//! Kana readings used as the common baseline for free-form answers.

use crate::error::{EngineError, Result};
use crate::parser::Corpus;
use std::collections::HashMap;
use std::io::Read;
use vibrato::{Dictionary, Tokenizer};
use wana_kana::{ConvertJapanese, IsJapaneseChar};

/// Converts Japanese text to a hiragana reading.
pub trait Reader: Send + Sync {
    fn to_kana(&self, text: &str) -> String;
}

/// Reader backed by a spelling-to-reading lexicon.
///
/// Text is rewritten by greedy longest match against the lexicon; whatever is left
/// (katakana, romaji) is folded to hiragana. Unknown kanji pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct LexiconReader {
    entries: HashMap<String, String>,
    // Okurigana stems, only matched when kana follows.
    stems: HashMap<String, String>,
    longest: usize,
}

impl LexiconReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lexicon seeded from every vocabulary item of the corpus.
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let mut reader = Self::new();
        for vocab in corpus.vocab() {
            reader.insert(&vocab.kanji, &vocab.reading);
        }
        reader
    }

    /// Add a spelling and its reading.
    ///
    /// When both end in the same kana (okurigana), the bare stem is kept as well, so
    /// 食べる/たべる also reads 食べます. A stem only applies in front of kana: 上がる
    /// says nothing about 上手.
    pub fn insert(&mut self, spelling: &str, reading: &str) {
        let reading = reading.to_hiragana();
        if spelling.is_empty() || reading.is_empty() || spelling == reading {
            return;
        }
        self.entries.insert(spelling.to_string(), reading.clone());
        self.longest = self.longest.max(spelling.chars().count());

        let mut stem: Vec<char> = spelling.chars().collect();
        let mut stem_reading: Vec<char> = reading.chars().collect();
        while let (Some(&a), Some(&b)) = (stem.last(), stem_reading.last()) {
            if a != b || !a.is_kana() {
                break;
            }
            stem.pop();
            stem_reading.pop();
        }
        if !stem.is_empty() && !stem_reading.is_empty() && stem.len() < spelling.chars().count() {
            let stem: String = stem.into_iter().collect();
            let stem_reading: String = stem_reading.into_iter().collect();
            self.stems.entry(stem).or_insert(stem_reading);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest entry starting at `at`, as (chars consumed, reading).
    fn longest_match(&self, chars: &[char], at: usize) -> Option<(usize, &str)> {
        let max = self.longest.min(chars.len() - at);
        for len in (1..=max).rev() {
            let candidate: String = chars[at..at + len].iter().collect();
            if let Some(reading) = self.entries.get(&candidate) {
                return Some((len, reading));
            }
            let followed_by_kana = chars.get(at + len).is_some_and(|c| c.is_kana());
            if followed_by_kana {
                if let Some(reading) = self.stems.get(&candidate) {
                    return Some((len, reading));
                }
            }
        }
        None
    }
}

impl Reader for LexiconReader {
    fn to_kana(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < chars.len() {
            match self.longest_match(&chars, i) {
                Some((len, reading)) => {
                    out.push_str(reading);
                    i += len;
                }
                None => {
                    out.push(chars[i]);
                    i += 1;
                }
            }
        }

        out.as_str().to_hiragana()
    }
}

/// Feature layout of a morphological dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DictionaryKind {
    #[default]
    Unidic,
    Ipadic,
}

impl DictionaryKind {
    /// Feature column holding the surface reading in katakana.
    pub fn reading_field(self) -> usize {
        match self {
            Self::Unidic => 20,
            Self::Ipadic => 7,
        }
    }
}

impl std::str::FromStr for DictionaryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unidic" => Ok(Self::Unidic),
            "ipadic" => Ok(Self::Ipadic),
            other => Err(format!("unknown dictionary kind {other:?}")),
        }
    }
}

/// Reader that segments text with a vibrato tokenizer and joins token readings.
///
/// Lexicon entries take precedence over the analyzer, so a corpus can pin the reading
/// it teaches. Tokens without a reading (unknown words, punctuation) keep their surface.
pub struct MorphologicalReader {
    tokenizer: Tokenizer,
    kind: DictionaryKind,
    overrides: LexiconReader,
}

impl MorphologicalReader {
    pub fn new(dictionary: Dictionary, kind: DictionaryKind) -> Self {
        Self {
            tokenizer: Tokenizer::new(dictionary),
            kind,
            overrides: LexiconReader::new(),
        }
    }

    /// Read a compiled vibrato system dictionary.
    pub fn read<R: Read>(rdr: R, kind: DictionaryKind) -> Result<Self> {
        let dictionary =
            Dictionary::read(rdr).map_err(|e| EngineError::Dictionary(e.to_string()))?;
        Ok(Self::new(dictionary, kind))
    }

    pub fn with_overrides(mut self, overrides: LexiconReader) -> Self {
        self.overrides = overrides;
        self
    }

    fn analyze(&self, text: &str, out: &mut String) {
        if text.is_empty() {
            return;
        }
        let field = self.kind.reading_field();
        let mut worker = self.tokenizer.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();
        for token in worker.token_iter() {
            let surface = token.surface();
            if !surface.chars().any(|c| c.is_kanji()) {
                out.push_str(surface);
                continue;
            }
            match token.feature().split(',').nth(field) {
                Some(reading) if !reading.is_empty() && reading != "*" => out.push_str(reading),
                _ => out.push_str(surface),
            }
        }
    }
}

impl Reader for MorphologicalReader {
    fn to_kana(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len() * 2);
        let mut pending = String::new();
        let mut i = 0;

        while i < chars.len() {
            match self.overrides.longest_match(&chars, i) {
                Some((len, reading)) => {
                    self.analyze(&pending, &mut out);
                    pending.clear();
                    out.push_str(reading);
                    i += len;
                }
                None => {
                    pending.push(chars[i]);
                    i += 1;
                }
            }
        }
        self.analyze(&pending, &mut out);

        out.as_str().to_hiragana()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use vibrato::SystemDictionaryBuilder;

    // IPADIC-style features; the reading is column 7.
    const LEXICON: &str = "\
食べ,0,0,10,動詞,自立,*,*,一段,連用形,食べる,タベ,タベ
ます,0,0,10,助動詞,*,*,*,特殊・マス,基本形,ます,マス,マス
上手,0,0,10,名詞,形容動詞語幹,*,*,*,*,上手,ジョウズ,ジョーズ
雨,0,0,10,名詞,一般,*,*,*,*,雨,アメ,アメ
今日,0,0,10,名詞,副詞可能,*,*,*,*,今日,キョウ,キョー
";
    const MATRIX: &str = "1 1\n0 0 0";
    const CHAR_DEF: &str = "DEFAULT 0 1 0";
    const UNK_DEF: &str = "DEFAULT,0,0,100,*,*,*,*,*,*,*,*,*";

    /// Tiny in-memory dictionary covering the words the tests read.
    pub(crate) fn morphological_reader() -> MorphologicalReader {
        let dictionary = SystemDictionaryBuilder::from_readers(
            LEXICON.as_bytes(),
            MATRIX.as_bytes(),
            CHAR_DEF.as_bytes(),
            UNK_DEF.as_bytes(),
        )
        .unwrap();
        MorphologicalReader::new(dictionary, DictionaryKind::Ipadic)
    }
}
