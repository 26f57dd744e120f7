//! redb backend for the shingle record store.
//!
//! Records live in a single table keyed by doc id, each value being the
//! little-endian encoding of the shingle set. The whole ingestion phase runs
//! inside one write transaction; [`RedbWriter::finish`] commits it and opens
//! a read transaction for the clustering phase.

use std::borrow::Cow;
use std::path::Path;

use redb::{
    Database, ReadOnlyTable, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition, WriteTransaction,
};
use tracing::debug;

use super::{decode_shingles, encode_shingles, ShingleReader, ShingleWriter};
use crate::{DocId, IndexError};

const SHINGLES_TABLE: TableDefinition<u32, &[u8]> = TableDefinition::new("shingles");

/// Write phase of a redb-backed store.
pub struct RedbWriter {
    txn: WriteTransaction,
    db: Database,
    written: usize,
    capacity: Option<usize>,
}

impl RedbWriter {
    /// Create (or open) the database at `path` and clear any records left
    /// by a previous run.
    pub fn create<P: AsRef<Path>>(path: P, capacity: Option<usize>) -> Result<Self, IndexError> {
        let db = Database::create(path.as_ref()).map_err(IndexError::backend)?;
        let txn = db.begin_write().map_err(IndexError::backend)?;
        let existed = txn.delete_table(SHINGLES_TABLE).map_err(IndexError::backend)?;
        {
            // Opening creates the table, so an empty run still finishes.
            txn.open_table(SHINGLES_TABLE).map_err(IndexError::backend)?;
        }
        debug!(
            path = %path.as_ref().display(),
            cleared_previous = existed,
            "redb_store_opened"
        );
        Ok(Self {
            txn,
            db,
            written: 0,
            capacity,
        })
    }
}

impl ShingleWriter for RedbWriter {
    type Snapshot = RedbSnapshot;

    fn put(&mut self, id: DocId, shingles: &[u32]) -> Result<(), IndexError> {
        let mut table = self
            .txn
            .open_table(SHINGLES_TABLE)
            .map_err(IndexError::backend)?;

        if let Some(capacity) = self.capacity {
            if self.written >= capacity && table.get(id).map_err(IndexError::backend)?.is_none() {
                return Err(IndexError::CapacityExceeded { capacity });
            }
        }

        let value = encode_shingles(shingles);
        let previous = table
            .insert(id, value.as_slice())
            .map_err(IndexError::backend)?;
        if previous.is_none() {
            self.written += 1;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.written
    }

    fn finish(self) -> Result<RedbSnapshot, IndexError> {
        let Self { txn, db, written, .. } = self;
        txn.commit().map_err(IndexError::backend)?;

        let read = db.begin_read().map_err(IndexError::backend)?;
        let table = read
            .open_table(SHINGLES_TABLE)
            .map_err(IndexError::backend)?;
        let len = table.len().map_err(IndexError::backend)? as usize;
        debug!(records = len, written, "redb_store_committed");

        Ok(RedbSnapshot { table, len, _db: db })
    }
}

/// Read phase of a redb-backed store.
pub struct RedbSnapshot {
    table: ReadOnlyTable<u32, &'static [u8]>,
    len: usize,
    _db: Database,
}

impl ShingleReader for RedbSnapshot {
    fn len(&self) -> usize {
        self.len
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(DocId, &[u32]) -> Result<(), IndexError>,
    ) -> Result<(), IndexError> {
        for item in self.table.iter().map_err(IndexError::backend)? {
            let (key, value) = item.map_err(IndexError::backend)?;
            let id = key.value();
            let shingles = decode_shingles(id, value.value())?;
            visitor(id, &shingles)?;
        }
        Ok(())
    }

    fn seek(&self, id: DocId) -> Result<Cow<'_, [u32]>, IndexError> {
        match self.table.get(id).map_err(IndexError::backend)? {
            Some(value) => Ok(Cow::Owned(decode_shingles(id, value.value())?)),
            None => Err(IndexError::MissingRecord(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn redb_store_roundtrip() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = RedbWriter::create(file.path(), None).unwrap();
        writer.put(0, &[3, 1, 2]).unwrap();
        writer.put(1, &[]).unwrap();
        writer.put(2, &[u32::MAX]).unwrap();
        assert_eq!(writer.len(), 3);

        let snapshot = writer.finish().unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(&*snapshot.seek(0).unwrap(), &[3, 1, 2]);
        assert!(snapshot.seek(1).unwrap().is_empty());
        assert_eq!(&*snapshot.seek(2).unwrap(), &[u32::MAX]);
        assert_eq!(snapshot.seek(9), Err(IndexError::MissingRecord(9)));
    }

    #[test]
    fn redb_scan_is_ascending_by_id() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = RedbWriter::create(file.path(), None).unwrap();
        for id in [5, 1, 3] {
            writer.put(id, &[id]).unwrap();
        }
        let snapshot = writer.finish().unwrap();

        let mut ids = Vec::new();
        snapshot
            .scan(&mut |id, shingles| {
                assert_eq!(shingles, &[id]);
                ids.push(id);
                Ok(())
            })
            .unwrap();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn redb_capacity_is_enforced() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = RedbWriter::create(file.path(), Some(1)).unwrap();
        writer.put(0, &[1]).unwrap();
        assert_eq!(
            writer.put(1, &[2]),
            Err(IndexError::CapacityExceeded { capacity: 1 })
        );
    }

    #[test]
    fn reopening_clears_previous_run() {
        let file = NamedTempFile::new().unwrap();
        {
            let mut writer = RedbWriter::create(file.path(), None).unwrap();
            writer.put(0, &[1]).unwrap();
            writer.put(1, &[2]).unwrap();
            writer.finish().unwrap();
        }

        let writer = RedbWriter::create(file.path(), None).unwrap();
        let snapshot = writer.finish().unwrap();
        assert!(snapshot.is_empty());
    }
}
