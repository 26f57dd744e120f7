//! Input sources.
//!
//! The document cache pulls `Result<RawRecord, IngestError>` items from any
//! iterator. [`JsonLinesSource`] is the stock one: one JSON object per line,
//! `{"id": "...", "text": "..."}`.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::IngestError;

/// One input document as handed to the cache.
///
/// Missing fields deserialize as empty strings so the cache, not the parser,
/// decides what an empty id or empty text means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    /// Caller-assigned identifier, echoed in the report.
    pub id: String,
    pub text: String,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Lazily parses JSON Lines records from a reader. Blank lines are ignored.
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IngestError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = Result<RawRecord, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.lines.next()?;
            self.line += 1;
            let line = match next {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str(&line).map_err(|err| IngestError::Parse {
                    line: self.line,
                    reason: err.to_string(),
                }),
            );
        }
    }
}
