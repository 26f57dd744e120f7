use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{DocId, IndexError};

/// Write side of the shingle record store.
///
/// Ingestion owns exactly one writer. [`finish`](ShingleWriter::finish)
/// commits everything that was put and hands back a read-only snapshot; a
/// writer dropped without finishing leaves nothing behind.
pub trait ShingleWriter {
    type Snapshot: ShingleReader;

    /// Store the shingle set of `id`. Fails with
    /// [`IndexError::CapacityExceeded`] once the store is full.
    fn put(&mut self, id: DocId, shingles: &[u32]) -> Result<(), IndexError>;

    /// Records written so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Commit and switch to read-only access.
    fn finish(self) -> Result<Self::Snapshot, IndexError>;
}

/// Read side of the shingle record store.
pub trait ShingleReader {
    /// Number of stored records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit every record once, ascending by doc id.
    fn scan(
        &self,
        visitor: &mut dyn FnMut(DocId, &[u32]) -> Result<(), IndexError>,
    ) -> Result<(), IndexError>;

    /// Fetch the exact set stored for `id`.
    fn seek(&self, id: DocId) -> Result<Cow<'_, [u32]>, IndexError>;
}

/// Which backend holds the records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// A `BTreeMap` in process memory.
    #[default]
    InMemory,
    /// A redb database file. Existing records in the file are replaced.
    ///
    /// Requires the `backend-redb` feature.
    Redb { path: PathBuf },
}

/// Record store configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: BackendConfig,
    /// Maximum number of records the store accepts; `None` is unbounded.
    pub capacity: Option<usize>,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_memory() -> Self {
        Self {
            backend: BackendConfig::InMemory,
            capacity: None,
        }
    }

    pub fn redb<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            backend: BackendConfig::Redb { path: path.into() },
            capacity: None,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

/// Open an in-memory writer.
pub fn open_in_memory(cfg: &StoreConfig) -> MemoryWriter {
    MemoryWriter {
        records: BTreeMap::new(),
        capacity: cfg.capacity,
    }
}

/// In-memory writer.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    records: BTreeMap<DocId, Vec<u32>>,
    capacity: Option<usize>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: BTreeMap::new(),
            capacity: Some(capacity),
        }
    }
}

impl ShingleWriter for MemoryWriter {
    type Snapshot = MemorySnapshot;

    fn put(&mut self, id: DocId, shingles: &[u32]) -> Result<(), IndexError> {
        if let Some(capacity) = self.capacity {
            if self.records.len() >= capacity && !self.records.contains_key(&id) {
                return Err(IndexError::CapacityExceeded { capacity });
            }
        }
        self.records.insert(id, shingles.to_vec());
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn finish(self) -> Result<MemorySnapshot, IndexError> {
        Ok(MemorySnapshot {
            records: self.records,
        })
    }
}

/// Read-only view over the records of a finished [`MemoryWriter`].
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshot {
    records: BTreeMap<DocId, Vec<u32>>,
}

impl ShingleReader for MemorySnapshot {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(DocId, &[u32]) -> Result<(), IndexError>,
    ) -> Result<(), IndexError> {
        for (&id, shingles) in &self.records {
            visitor(id, shingles)?;
        }
        Ok(())
    }

    fn seek(&self, id: DocId) -> Result<Cow<'_, [u32]>, IndexError> {
        self.records
            .get(&id)
            .map(|shingles| Cow::Borrowed(shingles.as_slice()))
            .ok_or(IndexError::MissingRecord(id))
    }
}

/// Little-endian on-disk layout of a shingle set.
pub fn encode_shingles(shingles: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(shingles.len() * 4);
    for shingle in shingles {
        bytes.extend_from_slice(&shingle.to_le_bytes());
    }
    bytes
}

/// Inverse of [`encode_shingles`].
pub fn decode_shingles(id: DocId, bytes: &[u8]) -> Result<Vec<u32>, IndexError> {
    if bytes.len() % 4 != 0 {
        return Err(IndexError::CorruptRecord {
            id,
            reason: format!("value length {} is not a multiple of 4", bytes.len()),
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(feature = "backend-redb")]
pub mod redb;

#[cfg(feature = "backend-redb")]
pub use self::redb::{RedbSnapshot, RedbWriter};
