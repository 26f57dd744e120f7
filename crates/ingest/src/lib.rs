//! Ingestion layer
//!
//! This is where documents enter the near-duplicate pipeline. Records of
//! `(external id, text)` are pulled from a source, normalized and shingled,
//! and written to the record store under dense, zero-based ids.
//!
//! ## What we do here
//!
//! - **Validate ids** - An empty external id is data corruption and stops the
//!   run.
//! - **Skip empty bodies** - A record with empty text gets no id and is
//!   never stored.
//! - **Shingle in parallel** - Records are pulled in batches and shingled on
//!   the rayon pool. Ids are handed out serially in input order, so the
//!   result does not depend on thread scheduling.
//! - **Keep the cross-reference** - `xref()[id]` is the external id of dense
//!   id `id`; the record store and the cross-reference share one key space.
//!
//! ## Example
//!
//! ```
//! use index::{MemoryWriter, ShingleReader, ShingleWriter};
//! use ingest::{DocumentCache, IngestConfig, RawRecord};
//! use canonical::ShingleConfig;
//!
//! let mut cache = DocumentCache::new(ShingleConfig::default(), IngestConfig::default()).unwrap();
//! let mut writer = MemoryWriter::new();
//! let records = vec![
//!     RawRecord::new("a", "the quick brown fox jumps"),
//!     RawRecord::new("b", ""),
//!     RawRecord::new("c", "lorem ipsum dolor sit amet"),
//! ];
//!
//! let stats = cache.add_documents(records.into_iter().map(Ok), &mut writer).unwrap();
//! assert_eq!((stats.stored, stats.skipped), (2, 1));
//! assert_eq!(cache.get_id_for(1), Some("c"));
//!
//! let snapshot = writer.finish().unwrap();
//! assert_eq!(snapshot.len(), 2);
//! ```

use std::time::Instant;

use canonical::{shingle_text, ShingleConfig, ShingleSet};
use index::{DocId, ShingleWriter};
use rayon::prelude::*;
use tracing::{debug, info, warn, Level};

mod config;
mod error;
mod source;

pub use crate::config::{ConfigError, IngestConfig};
pub use crate::error::IngestError;
pub use crate::source::{JsonLinesSource, RawRecord};

/// Counters for one [`DocumentCache::add_documents`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Records pulled from the source.
    pub records: usize,
    /// Records written to the store.
    pub stored: usize,
    /// Records dropped for having empty text.
    pub skipped: usize,
}

/// Assigns dense ids to incoming documents and remembers their external ids.
#[derive(Debug, Clone)]
pub struct DocumentCache {
    xref: Vec<String>,
    shingle_cfg: ShingleConfig,
    cfg: IngestConfig,
    // Position of the next record across calls, for error reporting.
    position: usize,
}

impl DocumentCache {
    pub fn new(shingle_cfg: ShingleConfig, cfg: IngestConfig) -> Result<Self, IngestError> {
        shingle_cfg.validate()?;
        cfg.validate()?;
        Ok(Self {
            xref: Vec::new(),
            shingle_cfg,
            cfg,
            position: 0,
        })
    }

    /// Ingest every record of `records` into `writer`.
    ///
    /// Stops at the first error. The caller should then drop `writer`
    /// without finishing it so no partial corpus is committed.
    pub fn add_documents<I, W>(
        &mut self,
        records: I,
        writer: &mut W,
    ) -> Result<IngestStats, IngestError>
    where
        I: IntoIterator<Item = Result<RawRecord, IngestError>>,
        W: ShingleWriter,
    {
        let start = Instant::now();
        let span = tracing::span!(Level::INFO, "ingest.add_documents", batch_size = self.cfg.batch_size);
        let _guard = span.enter();

        let mut stats = IngestStats::default();
        let mut batch = Vec::with_capacity(self.cfg.batch_size);
        let mut records = records.into_iter();

        let result = loop {
            match records.next() {
                Some(Ok(record)) => {
                    batch.push(record);
                    if batch.len() == self.cfg.batch_size {
                        if let Err(err) = self.flush_batch(&mut batch, writer, &mut stats) {
                            break Err(err);
                        }
                    }
                }
                // Records read before a source failure are still processed in
                // order, so an id error earlier in the stream wins.
                Some(Err(err)) => {
                    break self
                        .flush_batch(&mut batch, writer, &mut stats)
                        .and(Err(err));
                }
                None => break self.flush_batch(&mut batch, writer, &mut stats),
            }
        };

        let elapsed_micros = start.elapsed().as_micros();
        match result {
            Ok(()) => {
                info!(
                    records = stats.records,
                    stored = stats.stored,
                    skipped = stats.skipped,
                    total_docs = self.xref.len(),
                    elapsed_micros,
                    "ingest_success"
                );
                Ok(stats)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    records = stats.records,
                    stored = stats.stored,
                    elapsed_micros,
                    "ingest_failure"
                );
                Err(err)
            }
        }
    }

    fn flush_batch<W: ShingleWriter>(
        &mut self,
        batch: &mut Vec<RawRecord>,
        writer: &mut W,
        stats: &mut IngestStats,
    ) -> Result<(), IngestError> {
        if batch.is_empty() {
            return Ok(());
        }

        let shingle_cfg = &self.shingle_cfg;
        let shingle = |record: &RawRecord| -> Option<ShingleSet> {
            if record.id.is_empty() || record.text.is_empty() {
                None
            } else {
                Some(shingle_text(&record.text, shingle_cfg))
            }
        };
        let shingled: Vec<Option<ShingleSet>> = if self.cfg.use_parallel {
            batch.par_iter().map(shingle).collect()
        } else {
            batch.iter().map(shingle).collect()
        };

        for (record, shingles) in batch.drain(..).zip(shingled) {
            let position = self.position;
            self.position += 1;
            stats.records += 1;

            if record.id.is_empty() {
                return Err(IngestError::MissingExternalId { position });
            }
            let Some(shingles) = shingles else {
                debug!(position, external_id = %record.id, "ingest_skip_empty_text");
                stats.skipped += 1;
                continue;
            };

            let id = DocId::try_from(self.xref.len())
                .map_err(|_| IngestError::IdSpaceExhausted(self.xref.len()))?;
            writer.put(id, &shingles)?;
            self.xref.push(record.id);
            stats.stored += 1;

            if self.cfg.progress_every > 0 && self.xref.len() % self.cfg.progress_every == 0 {
                debug!(total_docs = self.xref.len(), "ingest_progress");
            }
        }
        Ok(())
    }

    /// External id of dense id `id`.
    pub fn get_id_for(&self, id: DocId) -> Option<&str> {
        self.xref.get(id as usize).map(String::as_str)
    }

    /// The whole cross-reference, indexed by dense id.
    pub fn xref(&self) -> &[String] {
        &self.xref
    }

    pub fn into_xref(self) -> Vec<String> {
        self.xref
    }

    /// Documents stored so far.
    pub fn len(&self) -> usize {
        self.xref.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xref.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use index::{IndexError, MemoryWriter, ShingleReader, StoreConfig};

    use super::*;

    fn cache(cfg: IngestConfig) -> DocumentCache {
        DocumentCache::new(ShingleConfig::default(), cfg).unwrap()
    }

    fn ok(records: Vec<RawRecord>) -> impl Iterator<Item = Result<RawRecord, IngestError>> {
        records.into_iter().map(Ok)
    }

    #[test]
    fn assigns_dense_ids_in_input_order() {
        let mut cache = cache(IngestConfig::default());
        let mut writer = MemoryWriter::new();
        let records = vec![
            RawRecord::new("x", "alpha beta gamma delta"),
            RawRecord::new("y", "epsilon zeta eta theta"),
            RawRecord::new("z", "iota kappa lambda mu"),
        ];

        let stats = cache.add_documents(ok(records), &mut writer).unwrap();
        assert_eq!(stats, IngestStats { records: 3, stored: 3, skipped: 0 });
        assert_eq!(cache.xref(), &["x", "y", "z"]);

        let snapshot = writer.finish().unwrap();
        let expected = shingle_text("epsilon zeta eta theta", &ShingleConfig::default());
        assert_eq!(&*snapshot.seek(1).unwrap(), expected.as_slice());
    }

    #[test]
    fn empty_text_is_skipped_without_an_id() {
        let mut cache = cache(IngestConfig::default());
        let mut writer = MemoryWriter::new();
        let records = vec![
            RawRecord::new("a", "one two three"),
            RawRecord::new("b", ""),
            RawRecord::new("c", "four five six"),
        ];

        let stats = cache.add_documents(ok(records), &mut writer).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(cache.xref(), &["a", "c"]);
        assert_eq!(writer.len(), 2);
    }

    #[test]
    fn empty_external_id_aborts() {
        let mut cache = cache(IngestConfig::default());
        let mut writer = MemoryWriter::new();
        let records = vec![
            RawRecord::new("a", "one two three"),
            RawRecord::new("b", ""),
            RawRecord::new("", "four five six"),
            RawRecord::new("d", "seven eight nine"),
        ];

        let err = cache.add_documents(ok(records), &mut writer).unwrap_err();
        assert_eq!(err, IngestError::MissingExternalId { position: 2 });
        assert_eq!(cache.xref(), &["a"]);
    }

    #[test]
    fn empty_id_wins_over_empty_text() {
        let mut cache = cache(IngestConfig::default());
        let mut writer = MemoryWriter::new();
        let err = cache
            .add_documents(ok(vec![RawRecord::new("", "")]), &mut writer)
            .unwrap_err();
        assert_eq!(err, IngestError::MissingExternalId { position: 0 });
    }

    #[test]
    fn store_capacity_error_propagates() {
        let mut cache = cache(IngestConfig::default());
        let mut writer = index::open_in_memory(&StoreConfig::in_memory().with_capacity(1));
        let records = vec![
            RawRecord::new("a", "one two three"),
            RawRecord::new("b", "four five six"),
        ];

        let err = cache.add_documents(ok(records), &mut writer).unwrap_err();
        assert_eq!(
            err,
            IngestError::Store(IndexError::CapacityExceeded { capacity: 1 })
        );
    }

    #[test]
    fn records_before_a_source_error_are_kept() {
        let mut cache = cache(IngestConfig::default());
        let mut writer = MemoryWriter::new();
        let records = vec![
            Ok(RawRecord::new("a", "one two three")),
            Err(IngestError::Parse { line: 2, reason: "bad".into() }),
            Ok(RawRecord::new("c", "four five six")),
        ];

        let err = cache.add_documents(records, &mut writer).unwrap_err();
        assert!(matches!(err, IngestError::Parse { line: 2, .. }));
        assert_eq!(cache.xref(), &["a"]);
    }

    #[test]
    fn batching_and_parallelism_do_not_change_ids() {
        let records: Vec<RawRecord> = (0..50)
            .map(|i| {
                let text = if i % 7 == 0 {
                    String::new()
                } else {
                    format!("doc {i} has words {} and {}", i * 3, i % 5)
                };
                RawRecord::new(format!("ext-{i}"), text)
            })
            .collect();

        let run = |cfg: IngestConfig| {
            let mut cache = cache(cfg);
            let mut writer = MemoryWriter::new();
            cache.add_documents(ok(records.clone()), &mut writer).unwrap();
            let snapshot = writer.finish().unwrap();
            let mut stored = Vec::new();
            snapshot
                .scan(&mut |id, shingles| {
                    stored.push((id, shingles.to_vec()));
                    Ok(())
                })
                .unwrap();
            (cache.into_xref(), stored)
        };

        let serial = run(IngestConfig::default().with_parallel(false).with_batch_size(1));
        let parallel = run(IngestConfig::default().with_batch_size(8));
        assert_eq!(serial, parallel);
        assert_eq!(serial.0.len(), 42);
    }

    #[test]
    fn ids_continue_across_calls() {
        let mut cache = cache(IngestConfig::default());
        let mut writer = MemoryWriter::new();
        cache
            .add_documents(ok(vec![RawRecord::new("a", "one two three")]), &mut writer)
            .unwrap();
        cache
            .add_documents(ok(vec![RawRecord::new("b", "four five six")]), &mut writer)
            .unwrap();
        assert_eq!(cache.get_id_for(1), Some("b"));
        assert_eq!(cache.get_id_for(2), None);
    }

    #[test]
    fn reads_from_json_lines() {
        let input = "{\"id\":\"a\",\"text\":\"the quick brown fox jumps\"}\n{\"id\":\"b\",\"text\":\"the quick brown fox jumps\"}\n";
        let mut cache = cache(IngestConfig::default());
        let mut writer = MemoryWriter::new();
        let stats = cache
            .add_documents(JsonLinesSource::new(input.as_bytes()), &mut writer)
            .unwrap();
        assert_eq!(stats.stored, 2);
    }

    #[test]
    fn invalid_configs_rejected() {
        assert!(matches!(
            DocumentCache::new(ShingleConfig::default().with_shingle_size(0), IngestConfig::default()),
            Err(IngestError::InvalidShingleConfig(_))
        ));
        assert!(matches!(
            DocumentCache::new(ShingleConfig::default(), IngestConfig::default().with_batch_size(0)),
            Err(IngestError::InvalidConfig(ConfigError::InvalidBatchSize))
        ));
    }
}
