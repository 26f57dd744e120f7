//! # Near-duplicate matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` runs the clustering phase. It reads a finished record store
//! snapshot (see [`index::ShingleReader`]) and partitions every stored
//! document into groups: one representative per group plus the members that
//! are near duplicates of it.
//!
//! ## Algorithm
//!
//! Documents are visited largest shingle set first. For each one the LSH
//! index (which only ever holds representatives) yields candidates; they are
//! verified with exact Jaccard similarity, largest first, and the scan stops
//! as soon as the size ratio alone rules a candidate out. The best match at
//! or above the threshold absorbs the document. Otherwise the document
//! becomes a new representative and enters the index.
//!
//! The loop is sequential because every decision depends on the index state
//! left by earlier ones. Signatures for the next batch of documents are
//! computed in parallel ahead of the loop and consumed in order.
//!
//! ## Core Types
//!
//! - [`ClusterConfig`]: similarity threshold and signature batch size.
//! - [`NearDupGroups`]: representative -> members, ordered by representative.
//! - [`GroupMember`]: member doc id and its score against the representative.
//! - [`ReportRow`]: flattened output rows, self row first for every group.
//!
//! ## Example Usage
//!
//! ```
//! use index::{MemoryWriter, ShingleWriter};
//! use matcher::{find_near_dupes, ClusterConfig};
//! use perceptual::{MinHashConfig, MinHasher};
//!
//! let mut writer = MemoryWriter::new();
//! writer.put(0, &[1, 2, 3, 4]).unwrap();
//! writer.put(1, &[1, 2, 3, 4]).unwrap();
//! writer.put(2, &[9, 10, 11]).unwrap();
//! let snapshot = writer.finish().unwrap();
//!
//! let hasher = MinHasher::new(&MinHashConfig::default()).unwrap();
//! let groups = find_near_dupes(&snapshot, &hasher, &ClusterConfig::default()).unwrap();
//!
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[&0][0].doc_id, 1);
//! assert!(groups[&2].is_empty());
//! ```

pub mod engine;
pub mod types;

pub use crate::engine::{cluster, find_near_dupes, Clustering};
pub use crate::types::{
    report_rows, ClusterConfig, ClusterStats, GroupMember, MatchError, NearDupGroups, ReportRow,
};
