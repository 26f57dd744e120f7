use std::borrow::Cow;
use std::cmp::Reverse;
use std::time::Instant;

use index::{DocId, LshIndex, LshParams, ShingleReader};
use perceptual::{calculate_similarity, MinHasher};
use tracing::{debug, info, warn, Level};

use crate::types::{ClusterConfig, ClusterStats, GroupMember, MatchError, NearDupGroups};


/// Groups plus the counters of the run that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub groups: NearDupGroups,
    pub stats: ClusterStats,
}

/// Partition every document of `reader` into near-duplicate groups.
pub fn find_near_dupes<R: ShingleReader>(
    reader: &R,
    hasher: &MinHasher,
    cfg: &ClusterConfig,
) -> Result<NearDupGroups, MatchError> {
    cluster(reader, hasher, cfg).map(|c| c.groups)
}

/// Like [`find_near_dupes`], also returning run counters.
///
/// # Panics
///
/// Panics if a stored shingle set is empty; the ingestion phase never
/// stores one.
pub fn cluster<R: ShingleReader>(
    reader: &R,
    hasher: &MinHasher,
    cfg: &ClusterConfig,
) -> Result<Clustering, MatchError> {
    let start = Instant::now();
    let span = tracing::span!(
        Level::INFO,
        "matcher.cluster",
        threshold = cfg.similarity_threshold,
        documents = reader.len()
    );
    let _guard = span.enter();

    match cluster_inner(reader, hasher, cfg) {
        Ok(clustering) => {
            let stats = &clustering.stats;
            info!(
                documents = stats.documents,
                representatives = stats.representatives,
                members = stats.members,
                candidates = stats.candidates,
                comparisons = stats.comparisons,
                early_stops = stats.early_stops,
                elapsed_micros = start.elapsed().as_micros(),
                "cluster_success"
            );
            Ok(clustering)
        }
        Err(err) => {
            warn!(
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "cluster_failure"
            );
            Err(err)
        }
    }
}

fn cluster_inner<R: ShingleReader>(
    reader: &R,
    hasher: &MinHasher,
    cfg: &ClusterConfig,
) -> Result<Clustering, MatchError> {
    cfg.validate()?;
    let threshold = cfg.similarity_threshold;

    let params = LshParams::solve(hasher.signature_size(), threshold)?;
    debug!(
        bands = params.bands,
        rows = params.rows,
        effective_threshold = params.threshold(),
        cp_probability = params.cp_probability(f64::from(threshold)),
        false_negatives_prob = params.false_negatives_prob(f64::from(threshold)),
        "lsh_params"
    );
    let mut lsh = LshIndex::new(params);

    let sizes = shingle_set_sizes(reader)?;
    let order = processing_order(&sizes);

    let mut groups = NearDupGroups::new();
    let mut stats = ClusterStats {
        documents: order.len(),
        bands: params.bands,
        rows: params.rows,
        ..ClusterStats::default()
    };

    for (batch_no, chunk) in order.chunks(cfg.signature_batch).enumerate() {
        let sets: Vec<Cow<'_, [u32]>> = chunk
            .iter()
            .map(|&id| reader.seek(id))
            .collect::<Result<_, _>>()?;
        let signatures = hasher.signatures(&sets);

        for ((&a, set_a), signature) in chunk.iter().zip(&sets).zip(&signatures) {
            let size_a = sizes[a as usize];

            let mut candidates = lsh.get_candidates(signature)?;
            stats.candidates += candidates.len();
            candidates.sort_unstable_by_key(|&b| (Reverse(sizes[b as usize]), b));

            let mut best: Option<DocId> = None;
            let mut best_score = 0.0f32;
            for b in candidates {
                let size_b = sizes[b as usize];
                // Candidates only shrink from here; Jaccard is bounded by the
                // size ratio.
                if (size_a as f32) / (size_b as f32) < threshold {
                    stats.early_stops += 1;
                    break;
                }
                let set_b = reader.seek(b)?;
                let score = calculate_similarity(set_a, &set_b);
                stats.comparisons += 1;
                if score > best_score {
                    best = Some(b);
                    best_score = score;
                }
            }

            match best {
                Some(rep) if best_score >= threshold => {
                    groups.entry(rep).or_default().push(GroupMember {
                        doc_id: a,
                        score: best_score,
                    });
                    stats.members += 1;
                }
                _ => {
                    lsh.insert(a, signature)?;
                    groups.insert(a, Vec::new());
                    stats.representatives += 1;
                }
            }
        }

        debug!(
            batch = batch_no,
            processed = (batch_no * cfg.signature_batch + chunk.len()),
            representatives = stats.representatives,
            buckets = lsh.bucket_count(),
            "cluster_progress"
        );
    }

    Ok(Clustering { groups, stats })
}

/// Shingle-set size of every document, indexed by dense id.
fn shingle_set_sizes<R: ShingleReader>(reader: &R) -> Result<Vec<usize>, MatchError> {
    let len = reader.len();
    let mut sizes = vec![0usize; len];
    let mut seen = 0usize;
    let mut sparse = None;
    reader.scan(&mut |id, shingles| {
        match sizes.get_mut(id as usize) {
            Some(size) => *size = shingles.len(),
            None => sparse = Some(id),
        }
        seen += 1;
        Ok(())
    })?;
    if let Some(id) = sparse {
        return Err(MatchError::SparseId { id, len });
    }
    debug_assert_eq!(seen, len);
    Ok(sizes)
}

/// Dense ids ordered by shingle-set size descending, ties by id ascending.
fn processing_order(sizes: &[usize]) -> Vec<DocId> {
    let mut order: Vec<DocId> = (0..sizes.len() as DocId).collect();
    order.sort_unstable_by_key(|&id| (Reverse(sizes[id as usize]), id));
    order
}
