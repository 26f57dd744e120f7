//! Jaccard similarity between shingle sets.

/// Exact Jaccard similarity `|A ∩ B| / |A ∪ B|` of two canonical shingle
/// sets.
///
/// Both inputs must be sorted and duplicate-free; the intersection is a
/// single merge pass. Two empty sets score 0.
pub fn calculate_similarity(a: &[u32], b: &[u32]) -> f32 {
    let (mut i, mut j) = (0usize, 0usize);
    let mut intersect = 0usize;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                intersect += 1;
                i += 1;
                j += 1;
            }
        }
    }
    let union = a.len() + b.len() - intersect;
    if union == 0 {
        return 0.0;
    }
    intersect as f32 / union as f32
}

/// MinHash estimate of Jaccard similarity: the fraction of rows on which
/// two signatures agree.
///
/// Signatures must come from the same [`MinHasher`](crate::MinHasher).
#[cfg(test)]
pub(crate) fn estimate_similarity(a: &[u32], b: &[u32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    let agree = a.iter().zip(b).filter(|(x, y)| x == y).count();
    agree as f32 / a.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MinHashConfig, MinHasher};

    #[test]
    fn self_similarity_is_one() {
        let set = vec![1u32, 5, 9, 200];
        assert_eq!(calculate_similarity(&set, &set), 1.0);
        assert_eq!(calculate_similarity(&[42], &[42]), 1.0);
    }

    #[test]
    fn disjoint_sets_score_zero() {
        assert_eq!(calculate_similarity(&[1, 2, 3], &[4, 5, 6]), 0.0);
    }

    #[test]
    fn partial_overlap() {
        // |A ∩ B| = 2, |A ∪ B| = 4
        assert_eq!(calculate_similarity(&[1, 2, 3], &[2, 3, 4]), 0.5);
    }

    #[test]
    fn symmetric() {
        let a = vec![1u32, 3, 5, 7, 9];
        let b = vec![3u32, 4, 5];
        assert_eq!(calculate_similarity(&a, &b), calculate_similarity(&b, &a));
    }

    #[test]
    fn bounded_by_size_ratio() {
        let big: Vec<u32> = (0..100).collect();
        let small: Vec<u32> = (0..40).collect();
        let score = calculate_similarity(&big, &small);
        assert!(score <= small.len() as f32 / big.len() as f32);
    }

    #[test]
    fn empty_sets_score_zero() {
        assert_eq!(calculate_similarity(&[], &[]), 0.0);
        assert_eq!(calculate_similarity(&[], &[1]), 0.0);
    }

    #[test]
    fn minhash_estimate_tracks_jaccard() {
        let hasher = MinHasher::new(&MinHashConfig::default()).unwrap();
        let a: Vec<u32> = (0..1000u32).map(|i| i.wrapping_mul(2_654_435_761)).collect();
        let mut b: Vec<u32> = (200..1200u32).map(|i| i.wrapping_mul(2_654_435_761)).collect();
        let mut a_sorted = a.clone();
        a_sorted.sort_unstable();
        b.sort_unstable();

        let exact = calculate_similarity(&a_sorted, &b);
        let estimate = estimate_similarity(&hasher.signature(&a_sorted), &hasher.signature(&b));
        assert!((exact - estimate).abs() < 0.2, "exact {exact} estimate {estimate}");
    }

    #[test]
    fn identical_sets_have_identical_signatures() {
        let hasher = MinHasher::new(&MinHashConfig::default()).unwrap();
        let set = vec![8u32, 16, 32];
        assert_eq!(estimate_similarity(&hasher.signature(&set), &hasher.signature(&set)), 1.0);
    }
}
