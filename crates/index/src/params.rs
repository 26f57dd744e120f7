//! LSH band/row parameter solver.
//!
//! For a signature of `L` rows split into `b` bands of `r` rows, two
//! documents with Jaccard similarity `s` share at least one band bucket with
//! probability `1 - (1 - s^r)^b`. That S-curve crosses 50% near
//! `(1/b)^(1/r)`, the effective threshold of the split.

use serde::{Deserialize, Serialize};

use crate::IndexError;

/// Effective similarity threshold of a `bands x rows` split.
pub fn lsh_threshold(bands: usize, rows: usize) -> f64 {
    (1.0 / bands as f64).powf(1.0 / rows as f64)
}

/// Probability that a pair with similarity `sim` becomes a candidate pair.
pub fn lsh_cp_probability(bands: usize, rows: usize, sim: f64) -> f64 {
    1.0 - (1.0 - sim.powi(rows as i32)).powi(bands as i32)
}

/// Reported false-negative rate at similarity `sim`: `(sim^rows)^bands`.
///
/// Kept for parity with existing diagnostics output. It is not the
/// complement of [`lsh_cp_probability`] (that would be
/// `(1 - sim^rows)^bands`), so do not build estimates on top of it.
pub fn lsh_false_negatives_prob(bands: usize, rows: usize, sim: f64) -> f64 {
    sim.powi(rows as i32).powi(bands as i32)
}

/// Choose `(bands, rows)` for a signature of `sig_size` rows.
///
/// Walks the divisors of `sig_size` by increasing row count and keeps the
/// last split whose effective threshold is still below
/// `similarity_threshold`. Sitting just below the requested threshold trades
/// extra candidate checks for fewer missed near duplicates. Falls back to
/// one row per band when even that split is at or above the threshold.
pub fn lsh_bands_n_rows(sig_size: usize, similarity_threshold: f32) -> (usize, usize) {
    let target = f64::from(similarity_threshold);
    let mut bands = sig_size;
    for rows in 1..=sig_size {
        if sig_size % rows != 0 {
            continue;
        }
        if lsh_threshold(sig_size / rows, rows) >= target {
            break;
        }
        bands = sig_size / rows;
    }
    (bands, sig_size / bands)
}

/// A validated band/row split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LshParams {
    pub bands: usize,
    pub rows: usize,
}

impl LshParams {
    /// Solve the split for `signature_size` rows and `similarity_threshold`
    /// in `(0, 1]`.
    pub fn solve(signature_size: usize, similarity_threshold: f32) -> Result<Self, IndexError> {
        if signature_size == 0 {
            return Err(IndexError::InvalidSignatureSize(signature_size));
        }
        if !(similarity_threshold > 0.0 && similarity_threshold <= 1.0) {
            return Err(IndexError::InvalidThreshold(similarity_threshold));
        }
        let (bands, rows) = lsh_bands_n_rows(signature_size, similarity_threshold);
        Ok(Self { bands, rows })
    }

    pub fn signature_size(&self) -> usize {
        self.bands * self.rows
    }

    pub fn threshold(&self) -> f64 {
        lsh_threshold(self.bands, self.rows)
    }

    pub fn cp_probability(&self, sim: f64) -> f64 {
        lsh_cp_probability(self.bands, self.rows, sim)
    }

    pub fn false_negatives_prob(&self, sim: f64) -> f64 {
        lsh_false_negatives_prob(self.bands, self.rows, sim)
    }
}
