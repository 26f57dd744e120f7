//! Error types produced by the ingest crate.
//!
//! | Error | Fatal | Raised when |
//! |-------|-------|-------------|
//! | [`MissingExternalId`](IngestError::MissingExternalId) | yes | a record carries an empty external id |
//! | [`Store`](IngestError::Store) | yes | the record store refuses a write (e.g. capacity) |
//! | [`Parse`](IngestError::Parse) | yes | an input line is not a valid record |
//! | [`Io`](IngestError::Io) | yes | the input cannot be read |
//! | [`IdSpaceExhausted`](IngestError::IdSpaceExhausted) | yes | more records than dense ids |
//!
//! Records with empty text are not errors; they are skipped and counted.
//! Every error aborts the run: nothing written by the unfinished store
//! writer is committed.

use canonical::CanonicalError;
use index::IndexError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IngestError {
    /// Data corruption: the record at `position` (zero-based, counting every
    /// record pulled from the source) has an empty external id.
    #[error("record {position} has an empty external id")]
    MissingExternalId { position: usize },
    #[error("record store write failed: {0}")]
    Store(#[from] IndexError),
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("input read failed: {0}")]
    Io(String),
    #[error("dense id space exhausted after {0} records")]
    IdSpaceExhausted(usize),
    #[error("invalid ingest config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("invalid shingle config: {0}")]
    InvalidShingleConfig(#[from] CanonicalError),
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
