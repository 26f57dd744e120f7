//! # Near-duplicate index
//!
//! Everything the clustering pass needs to look documents up:
//!
//! - **LSH index** ([`LshIndex`]): splits a MinHash signature into bands of
//!   rows, hashes each band to a bucket and keeps `bucket -> doc ids` per
//!   band. Documents sharing at least one bucket with a query are its
//!   candidates.
//! - **Parameter solver** ([`LshParams::solve`]): picks the band/row split of
//!   a signature whose S-curve threshold sits just below the requested
//!   similarity threshold, plus the probability helpers used for diagnostics.
//! - **Record store** ([`ShingleWriter`] / [`ShingleReader`]): the key-value
//!   store holding each document's shingle set under its dense id. Writing
//!   and reading are separate types: a writer is consumed by
//!   [`ShingleWriter::finish`] and turns into a read-only snapshot, so the
//!   clustering pass cannot mutate stored records.
//!
//! Backends: an in-memory `BTreeMap` (tests, small corpora) and redb
//! (`backend-redb` feature, on by default) for corpora that do not fit in
//! memory.
//!
//! ```
//! use index::{LshIndex, LshParams};
//!
//! let params = LshParams::solve(256, 0.8).unwrap();
//! assert_eq!((params.bands, params.rows), (32, 8));
//!
//! let mut lsh = LshIndex::new(params);
//! let signature: Vec<u32> = (0..256).collect();
//! lsh.insert(7, &signature).unwrap();
//! assert_eq!(lsh.get_candidates(&signature).unwrap(), vec![7]);
//! ```

mod backend;
mod lsh;
mod params;

pub use backend::{
    decode_shingles, encode_shingles, open_in_memory, BackendConfig, MemorySnapshot, MemoryWriter,
    ShingleReader, ShingleWriter, StoreConfig,
};
#[cfg(feature = "backend-redb")]
pub use backend::{RedbSnapshot, RedbWriter};
pub use lsh::LshIndex;
pub use params::{
    lsh_bands_n_rows, lsh_cp_probability, lsh_false_negatives_prob, lsh_threshold, LshParams,
};

use thiserror::Error;

/// Dense, zero-based document identifier assigned in ingestion order.
///
/// Used as the record store key and as the array index of every per-document
/// table during clustering.
pub type DocId = u32;

/// Errors raised by the index and the record store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("record store is full (capacity {capacity} records)")]
    CapacityExceeded { capacity: usize },
    #[error("no record stored for doc id {0}")]
    MissingRecord(DocId),
    #[error("corrupt record for doc id {id}: {reason}")]
    CorruptRecord { id: DocId, reason: String },
    #[error("signature has {got} rows, index expects {expected}")]
    SignatureLength { expected: usize, got: usize },
    #[error("invalid similarity threshold {0}; expected a value in (0, 1]")]
    InvalidThreshold(f32),
    #[error("invalid signature size {0}; expected >= 1")]
    InvalidSignatureSize(usize),
}

impl IndexError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}
