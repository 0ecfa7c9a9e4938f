//! Test fixtures and factory functions for creating test data.

use chrono::NaiveDate;
use std::io::Write;
use tempfile::NamedTempFile;

/// Fixed study day used across tests.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
}

/// Sample corpus: two synonym groups, one ungrouped sentence, vocab on two rows,
/// one row activating in the future and one malformed vocab row.
pub const SAMPLE_CSV: &str = "\
Sentence,Translation,Group,Parsing,Vocab List,Meaning,Time
毎朝パンを食べます,I eat bread every morning,breakfast,毎朝+パンを+食べます,食べる｜たべる。毎朝｜まいあさ,to eat。every morning,2024-03-01
朝ごはんにパンを食べます,I eat bread for breakfast,breakfast,朝ごはんに+パンを+食べます,,,2024-03-01
雨が降っています,It is raining,weather,雨が+降っています,雨|あめ,rain,2024/03/02
今日は晴れです,It is sunny today,weather,今日は+晴れです,,,
本を読みます,I read a book,,本を+読みます,本|ほん。読む|よむ,book,
来週の文です,A sentence for next week,,,,,2024-05-17
";

/// Write `contents` to a temporary CSV file.
pub fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
