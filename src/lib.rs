//! Workspace umbrella crate for near-duplicate detection.
//!
//! This crate wires the stages together so callers can go from a stream of
//! `(external id, text)` records to a near-duplicate report with one call:
//!
//! 1. **Ingest** ([`ingest`]) normalizes and shingles each record and writes
//!    its shingle set to the record store under a dense id.
//! 2. The store writer is finished into a read-only **snapshot**.
//! 3. **Cluster** ([`matcher`]) groups the snapshot's documents greedily,
//!    largest first, using MinHash signatures ([`perceptual`]) and a banded
//!    LSH index ([`index`]).
//! 4. The groups are resolved back to external ids and written as CSV.
//!
//! ```
//! use neardup::{run_pipeline, write_csv_report, NearDupConfig, RawRecord};
//!
//! let records = vec![
//!     RawRecord::new("a", "the quick brown fox jumps"),
//!     RawRecord::new("b", "the quick brown fox jumps"),
//!     RawRecord::new("c", "lorem ipsum dolor sit amet"),
//! ];
//! let report = run_pipeline(records.into_iter().map(Ok), &NearDupConfig::default()).unwrap();
//! assert_eq!(report.groups.len(), 2);
//!
//! let mut csv = Vec::new();
//! write_csv_report(&report, &mut csv).unwrap();
//! assert!(String::from_utf8(csv).unwrap().starts_with("DocA, DocB, Similarity\n"));
//! ```

mod config;
mod report;

use std::time::{Duration, Instant};

pub use canonical::{
    generate_shingles, normalize_text, shingle_text, CanonicalError, ShingleConfig, ShingleSet,
};
pub use index::{
    lsh_bands_n_rows, lsh_cp_probability, lsh_false_negatives_prob, lsh_threshold,
    open_in_memory, BackendConfig, DocId, IndexError, LshIndex, LshParams, MemorySnapshot,
    MemoryWriter, ShingleReader, ShingleWriter, StoreConfig,
};
#[cfg(feature = "redb")]
pub use index::{RedbSnapshot, RedbWriter};
pub use ingest::{
    DocumentCache, IngestConfig, IngestError, IngestStats, JsonLinesSource, RawRecord,
};
pub use matcher::{
    ClusterConfig, ClusterStats, GroupMember, MatchError, NearDupGroups, ReportRow,
};
pub use perceptual::{
    calculate_similarity, MinHashConfig, MinHashSignature, MinHasher, PerceptualError,
};

pub use crate::config::{ConfigLoadError, NearDupConfig, OutputConfig};
pub use crate::report::{write_csv_report, write_report_file, ResolvedRow};

use thiserror::Error;
use tracing::{info, warn, Level};

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("ingest failure: {0}")]
    Ingest(#[from] IngestError),
    #[error("clustering failure: {0}")]
    Match(#[from] MatchError),
    #[error("record store failure: {0}")]
    Index(#[from] IndexError),
    #[error("signature setup failure: {0}")]
    Perceptual(#[from] PerceptualError),
    #[error("store backend `{0}` is not compiled in")]
    BackendUnavailable(&'static str),
    #[error("group refers to doc id {0} with no external id")]
    UnknownDocId(DocId),
    #[error("report write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct NearDupReport {
    /// Representative -> members, keyed by dense id.
    pub groups: NearDupGroups,
    /// External id of each dense id.
    pub xref: Vec<String>,
    pub ingest: IngestStats,
    pub cluster: ClusterStats,
    pub ingest_elapsed: Duration,
    pub cluster_elapsed: Duration,
}

impl NearDupReport {
    /// External id of dense id `id`.
    pub fn external_id(&self, id: DocId) -> Result<&str, PipelineError> {
        self.xref
            .get(id as usize)
            .map(String::as_str)
            .ok_or(PipelineError::UnknownDocId(id))
    }

    /// Report rows with external ids: per group the self row at `1.0`, then
    /// one row per member.
    pub fn resolved_rows(&self) -> Result<Vec<ResolvedRow<'_>>, PipelineError> {
        matcher::report_rows(&self.groups)
            .into_iter()
            .map(|row| {
                Ok(ResolvedRow {
                    doc_a: self.external_id(row.doc_a)?,
                    doc_b: self.external_id(row.doc_b)?,
                    similarity: row.similarity,
                })
            })
            .collect()
    }

    /// Groups with at least one member.
    pub fn duplicate_groups(&self) -> usize {
        self.groups.values().filter(|m| !m.is_empty()).count()
    }
}

/// Run ingestion and clustering with the store backend named in `cfg`.
pub fn run_pipeline<I>(records: I, cfg: &NearDupConfig) -> Result<NearDupReport, PipelineError>
where
    I: IntoIterator<Item = Result<RawRecord, IngestError>>,
{
    match &cfg.store.backend {
        BackendConfig::InMemory => {
            run_with_writer(records, open_in_memory(&cfg.store), cfg)
        }
        #[cfg(feature = "redb")]
        BackendConfig::Redb { path } => {
            let writer = RedbWriter::create(path, cfg.store.capacity)?;
            run_with_writer(records, writer, cfg)
        }
        #[cfg(not(feature = "redb"))]
        BackendConfig::Redb { .. } => Err(PipelineError::BackendUnavailable("redb")),
    }
}

/// Run ingestion into `writer`, finish it, then cluster the snapshot.
///
/// If ingestion fails the writer is dropped unfinished, so nothing it
/// received is committed.
pub fn run_with_writer<I, W>(
    records: I,
    mut writer: W,
    cfg: &NearDupConfig,
) -> Result<NearDupReport, PipelineError>
where
    I: IntoIterator<Item = Result<RawRecord, IngestError>>,
    W: ShingleWriter,
{
    let span = tracing::span!(Level::INFO, "neardup.pipeline");
    let _guard = span.enter();

    let hasher = MinHasher::new(&cfg.minhash)?;
    let mut cache = DocumentCache::new(cfg.shingle.clone(), cfg.ingest.clone())?;

    let start = Instant::now();
    let ingest = cache.add_documents(records, &mut writer)?;
    let snapshot = writer.finish()?;
    let ingest_elapsed = start.elapsed();
    info!(
        documents = snapshot.len(),
        elapsed_ms = ingest_elapsed.as_millis(),
        "ingest_phase_done"
    );

    let start = Instant::now();
    let clustering = match matcher::cluster(&snapshot, &hasher, &cfg.cluster) {
        Ok(clustering) => clustering,
        Err(err) => {
            warn!(error = %err, "cluster_phase_failed");
            return Err(err.into());
        }
    };
    let cluster_elapsed = start.elapsed();
    info!(
        groups = clustering.groups.len(),
        members = clustering.stats.members,
        elapsed_ms = cluster_elapsed.as_millis(),
        "cluster_phase_done"
    );

    Ok(NearDupReport {
        groups: clustering.groups,
        xref: cache.into_xref(),
        ingest,
        cluster: clustering.stats,
        ingest_elapsed,
        cluster_elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(pairs: &[(&str, &str)]) -> Vec<Result<RawRecord, IngestError>> {
        pairs.iter().map(|(id, text)| Ok(RawRecord::new(*id, *text))).collect()
    }

    #[test]
    fn resolves_external_ids() {
        let report = run_pipeline(
            records(&[
                ("first", "one two three four"),
                ("second", "one two three four"),
            ]),
            &NearDupConfig::default(),
        )
        .unwrap();

        let rows: Vec<_> = report
            .resolved_rows()
            .unwrap()
            .into_iter()
            .map(|r| (r.doc_a, r.doc_b, r.similarity))
            .collect();
        assert_eq!(rows, vec![("first", "first", 1.0), ("first", "second", 1.0)]);
        assert_eq!(report.duplicate_groups(), 1);
    }

    #[test]
    fn unknown_doc_id_is_reported() {
        let mut report = run_pipeline(
            records(&[("only", "one two three")]),
            &NearDupConfig::default(),
        )
        .unwrap();
        report.xref.clear();
        assert!(matches!(
            report.resolved_rows(),
            Err(PipelineError::UnknownDocId(0))
        ));
    }

    #[test]
    fn invalid_minhash_config_fails_before_ingest() {
        let mut cfg = NearDupConfig::default();
        cfg.minhash.signature_size = 0;
        assert!(matches!(
            run_pipeline(records(&[("a", "x y z")]), &cfg),
            Err(PipelineError::Perceptual(_))
        ));
    }
}
