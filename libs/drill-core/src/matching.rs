//! Answer evaluation per modality.

use crate::modality::{Comparison, Modality};
use crate::parser::GroupIndex;
use crate::reading::Reader;
use crate::types::LearningItem;
use serde::{Deserialize, Serialize};

/// Punctuation ignored by free-form comparison, in addition to whitespace.
const IGNORED_PUNCTUATION: [char; 12] = ['。', '、', '？', '！', '?', '!', '.', ',', '，', '．', '「', '」'];

/// Result of judging a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// The comparison policy used.
    pub comparison: Comparison,
    /// The expected answer, for display.
    pub target: String,
    /// Normalized response (for display).
    pub typed_normalized: String,
    /// Normalized target (for display).
    pub target_normalized: String,
    /// Character diff, only for wrong free-form answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<Vec<DiffSegment>>,
}

/// The text a response to `modality` is compared against.
pub fn target<'a>(item: &'a LearningItem, modality: Modality) -> &'a str {
    match (item, modality) {
        (
            LearningItem::Sentence(s),
            Modality::ChooseTranslation | Modality::ListenChooseTranslation,
        ) => &s.translation,
        (LearningItem::Vocab(v), Modality::RecallReading) => &v.reading,
        (LearningItem::Vocab(v), Modality::ListenChooseMeaning) => &v.meaning,
        _ => item.key(),
    }
}

/// Judge `input` as an answer to `item` asked with `modality`.
pub fn evaluate(
    item: &LearningItem,
    modality: Modality,
    input: &str,
    groups: &GroupIndex,
    reader: &dyn Reader,
) -> Evaluation {
    let target = target(item, modality).to_string();
    let comparison = modality.comparison();

    match comparison {
        Comparison::Exact => {
            let typed_normalized = strip_whitespace(input);
            let target_normalized = strip_whitespace(&target);
            Evaluation {
                is_correct: typed_normalized == target_normalized,
                comparison,
                target,
                typed_normalized,
                target_normalized,
                diff: None,
            }
        }
        Comparison::GroupMember => {
            let is_correct = item
                .as_sentence()
                .and_then(|s| s.group.as_deref())
                .is_some_and(|g| groups.contains(g, input));
            Evaluation {
                is_correct,
                comparison,
                typed_normalized: input.to_string(),
                target_normalized: target.clone(),
                target,
                diff: None,
            }
        }
        Comparison::Phonetic => {
            let typed_normalized = reader.to_kana(&strip_punctuation(input));
            let target_normalized = reader.to_kana(&strip_punctuation(&target));
            let is_correct = typed_normalized == target_normalized;
            let diff = (!is_correct).then(|| char_diff(input.trim(), &target));
            Evaluation {
                is_correct,
                comparison,
                target,
                typed_normalized,
                target_normalized,
                diff,
            }
        }
    }
}

/// Remove every whitespace character, including the ideographic space.
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Remove whitespace and sentence punctuation.
pub fn strip_punctuation(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && !IGNORED_PUNCTUATION.contains(c))
        .collect()
}

/// Kind of a diff span.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DiffType {
    /// Text is the same in both strings.
    Same,
    /// Text was added (in correct but not typed).
    Added,
    /// Text was removed (in typed but not correct).
    Removed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffSegment {
    pub text: String,
    pub diff_type: DiffType,
}

/// Character-level diff between typed and correct answers.
///
/// Based on the longest common subsequence; adjacent characters of the same kind are
/// merged into one span.
pub fn char_diff(typed: &str, correct: &str) -> Vec<DiffSegment> {
    let a: Vec<char> = typed.chars().collect();
    let b: Vec<char> = correct.chars().collect();
    let (m, n) = (a.len(), b.len());

    // lcs[i][j] = LCS length of a[i..] and b[j..]
    let mut lcs = vec![vec![0usize; n + 1]; m + 1];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut result: Vec<DiffSegment> = Vec::new();
    let mut push = |c: char, diff_type: DiffType| {
        if let Some(last) = result.last_mut().filter(|l| l.diff_type == diff_type) {
            last.text.push(c);
            return;
        }
        result.push(DiffSegment {
            text: c.to_string(),
            diff_type,
        });
    };

    let (mut i, mut j) = (0, 0);
    while i < m && j < n {
        if a[i] == b[j] {
            push(a[i], DiffType::Same);
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            push(a[i], DiffType::Removed);
            i += 1;
        } else {
            push(b[j], DiffType::Added);
            j += 1;
        }
    }
    for &c in &a[i..] {
        push(c, DiffType::Removed);
    }
    for &c in &b[j..] {
        push(c, DiffType::Added);
    }

    result
}
