use std::collections::BTreeMap;

use index::{DocId, IndexError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default similarity threshold.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.8;

/// Configuration of one clustering run.
///
/// `ClusterConfig` is cheap to clone and serde-friendly so it can be embedded
/// in higher-level configs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    /// Minimum Jaccard similarity, in `(0, 1]`, for a document to join an
    /// existing group.
    pub similarity_threshold: f32,
    /// Documents whose signatures are computed ahead of the clustering loop
    /// in one parallel pass.
    pub signature_batch: usize,
}

impl ClusterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, similarity_threshold: f32) -> Self {
        self.similarity_threshold = similarity_threshold;
        self
    }

    pub fn with_signature_batch(mut self, signature_batch: usize) -> Self {
        self.signature_batch = signature_batch;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        let t = self.similarity_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(MatchError::InvalidThreshold(t));
        }
        if self.signature_batch == 0 {
            return Err(MatchError::InvalidSignatureBatch);
        }
        Ok(())
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            signature_batch: 1024,
        }
    }
}

/// Errors produced by the clustering phase.
///
/// None of these are expected on a store written by the ingestion phase;
/// they abort the run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("invalid similarity threshold {0}; expected a value in (0, 1]")]
    InvalidThreshold(f32),
    #[error("signature_batch must be >= 1")]
    InvalidSignatureBatch,
    #[error("doc id {id} is outside the dense range 0..{len}")]
    SparseId { id: DocId, len: usize },
    #[error("store or index failure: {0}")]
    Index(#[from] IndexError),
}

/// One absorbed document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub doc_id: DocId,
    /// Exact Jaccard similarity against the representative.
    pub score: f32,
}

/// Representative doc id -> members, in the order they were absorbed.
///
/// Every stored document is either exactly one key or exactly one member.
pub type NearDupGroups = BTreeMap<DocId, Vec<GroupMember>>;

/// Counters for one clustering run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStats {
    pub documents: usize,
    pub representatives: usize,
    pub members: usize,
    /// Candidates returned by the LSH index, summed over all queries.
    pub candidates: usize,
    /// Exact similarity computations performed.
    pub comparisons: usize,
    /// Candidate scans cut short by the size-ratio bound.
    pub early_stops: usize,
    pub bands: usize,
    pub rows: usize,
}

/// One output row: `(doc_a, doc_b, similarity)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub doc_a: DocId,
    pub doc_b: DocId,
    pub similarity: f32,
}

/// Flatten groups into report rows: per group, the representative paired
/// with itself at `1.0`, then one row per member.
pub fn report_rows(groups: &NearDupGroups) -> Vec<ReportRow> {
    let mut rows = Vec::with_capacity(groups.len() + groups.values().map(Vec::len).sum::<usize>());
    for (&rep, members) in groups {
        rows.push(ReportRow {
            doc_a: rep,
            doc_b: rep,
            similarity: 1.0,
        });
        rows.extend(members.iter().map(|m| ReportRow {
            doc_a: rep,
            doc_b: m.doc_id,
            similarity: m.score,
        }));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation() {
        assert!(ClusterConfig::default().validate().is_ok());
        assert!(ClusterConfig::default().with_threshold(1.0).validate().is_ok());
        assert_eq!(
            ClusterConfig::default().with_threshold(0.0).validate(),
            Err(MatchError::InvalidThreshold(0.0))
        );
        assert!(ClusterConfig::default().with_threshold(1.5).validate().is_err());
        assert!(ClusterConfig::default()
            .with_threshold(f32::NAN)
            .validate()
            .is_err());
        assert_eq!(
            ClusterConfig::default().with_signature_batch(0).validate(),
            Err(MatchError::InvalidSignatureBatch)
        );
    }

    #[test]
    fn report_rows_put_self_row_first() {
        let mut groups = NearDupGroups::new();
        groups.insert(
            3,
            vec![
                GroupMember { doc_id: 5, score: 0.9 },
                GroupMember { doc_id: 1, score: 1.0 },
            ],
        );
        groups.insert(0, Vec::new());

        let rows = report_rows(&groups);
        let flat: Vec<_> = rows.iter().map(|r| (r.doc_a, r.doc_b, r.similarity)).collect();
        assert_eq!(
            flat,
            vec![(0, 0, 1.0), (3, 3, 1.0), (3, 5, 0.9), (3, 1, 1.0)]
        );
    }

    #[test]
    fn config_from_json() {
        let cfg: ClusterConfig = serde_json::from_str(r#"{ "similarity_threshold": 0.5 }"#).unwrap();
        assert_eq!(cfg.similarity_threshold, 0.5);
        assert_eq!(cfg.signature_batch, 1024);
    }
}
