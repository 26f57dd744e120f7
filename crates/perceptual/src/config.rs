//! Configuration and error types for MinHash signatures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signature width used by the near-duplicate pipeline.
pub const SIGNATURE_SIZE: usize = 256;

/// Seed of the coefficient table.
pub const DEFAULT_MINHASH_SEED: u64 = 71;

/// Signature generator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MinHashConfig {
    /// Number of rows (coefficients) per signature.
    ///
    /// The LSH parameter solver splits this width into bands, so widths with
    /// many divisors give it more room.
    pub signature_size: usize,
    /// Seed of the coefficient table. Equal seeds give equal tables on every
    /// run and every machine.
    pub seed: u64,
    /// Compute signature rows with rayon.
    pub use_parallel: bool,
}

impl MinHashConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signature_size(mut self, signature_size: usize) -> Self {
        self.signature_size = signature_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.signature_size == 0 {
            return Err(PerceptualError::InvalidSignatureSize {
                size: self.signature_size,
            });
        }
        Ok(())
    }
}

impl Default for MinHashConfig {
    fn default() -> Self {
        Self {
            signature_size: SIGNATURE_SIZE,
            seed: DEFAULT_MINHASH_SEED,
            use_parallel: true,
        }
    }
}

/// Errors returned when building a [`MinHasher`](crate::MinHasher).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("invalid config: signature_size must be >= 1 (got {size})")]
    InvalidSignatureSize { size: usize },
}
