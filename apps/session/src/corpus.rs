//! CSV corpus source.

use crate::error::StoreError;
use crate::store::CorpusSource;
use drill_core::CorpusRow;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Corpus stored as a UTF-8 CSV file with a header row.
///
/// Columns are matched by header name; unknown columns are ignored and missing ones
/// read as empty.
#[derive(Debug, Clone)]
pub struct CsvCorpus {
    path: PathBuf,
}

impl CsvCorpus {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CorpusSource for CsvCorpus {
    fn fetch_rows(&mut self) -> Result<Vec<CorpusRow>, StoreError> {
        let file = std::fs::File::open(&self.path)?;
        read_rows(file)
    }
}

/// Parse corpus rows from any CSV reader.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<CorpusRow>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}
