//! XOR MinHash over shingle sets.
//!
//! The coefficient table is derived from a single 64-bit seed with
//! SplitMix64, one key per row, and then frozen inside [`MinHasher`].

use rayon::prelude::*;

use crate::config::{MinHashConfig, PerceptualError};

/// One minimum per coefficient, `signature_size` values long.
pub type MinHashSignature = Vec<u32>;

/// Signature generator holding the read-only coefficient table.
///
/// Build it once per run and share it by reference; it is `Send + Sync`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinHasher {
    coefficients: Vec<u32>,
    use_parallel: bool,
}

impl MinHasher {
    /// Build the coefficient table for `cfg`.
    pub fn new(cfg: &MinHashConfig) -> Result<Self, PerceptualError> {
        cfg.validate()?;
        let coefficients = (0..cfg.signature_size)
            .map(|row| coefficient(cfg.seed, row))
            .collect();
        Ok(Self {
            coefficients,
            use_parallel: cfg.use_parallel,
        })
    }

    pub fn coefficients(&self) -> &[u32] {
        &self.coefficients
    }

    pub fn signature_size(&self) -> usize {
        self.coefficients.len()
    }

    /// Compute the signature of one shingle set.
    ///
    /// # Panics
    ///
    /// Panics if `shingles` is empty. Every stored document has at least one
    /// shingle, so an empty set here is a caller bug.
    pub fn signature(&self, shingles: &[u32]) -> MinHashSignature {
        assert!(
            !shingles.is_empty(),
            "MinHash signature requested for an empty shingle set"
        );

        let mut result = Vec::with_capacity(self.coefficients.len());
        if self.use_parallel {
            self.coefficients
                .par_iter()
                .map(|&coeff| min_xor(shingles, coeff))
                .collect_into_vec(&mut result);
        } else {
            result.extend(
                self.coefficients
                    .iter()
                    .map(|&coeff| min_xor(shingles, coeff)),
            );
        }
        result
    }

    /// Compute signatures for a batch of documents, preserving input order.
    /// Documents are spread across rayon workers when `use_parallel` is set.
    pub fn signatures<S>(&self, sets: &[S]) -> Vec<MinHashSignature>
    where
        S: AsRef<[u32]> + Sync,
    {
        if self.use_parallel {
            sets.par_iter()
                .map(|set| self.signature(set.as_ref()))
                .collect()
        } else {
            sets.iter().map(|set| self.signature(set.as_ref())).collect()
        }
    }
}

#[inline]
fn min_xor(shingles: &[u32], coeff: u32) -> u32 {
    shingles
        .iter()
        .fold(u32::MAX, |min, &hash| min.min(hash ^ coeff))
}

/// Key for one row: the high half of SplitMix64 over a golden-ratio stride.
#[inline]
fn coefficient(seed: u64, row: usize) -> u32 {
    let step = (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    (splitmix64(seed.wrapping_add(step)) >> 32) as u32
}

#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
