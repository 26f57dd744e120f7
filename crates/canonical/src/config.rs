//! Shingling configuration.

use serde::{Deserialize, Serialize};

use crate::CanonicalError;

/// Number of tokens per shingle.
pub const DEFAULT_SHINGLE_SIZE: usize = 3;

/// Seed fed to the shingle hash. Changing it changes every shingle set.
pub const DEFAULT_SHINGLE_SEED: u32 = 71;

/// Controls how normalized text is cut into shingles.
///
/// Two runs with equal configs over the same text produce bit-identical
/// shingle sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShingleConfig {
    /// Tokens per shingle (k).
    pub shingle_size: usize,
    /// Seed of the 32-bit shingle hash.
    pub seed: u32,
}

impl ShingleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shingle_size(mut self, shingle_size: usize) -> Self {
        self.shingle_size = shingle_size;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), CanonicalError> {
        if self.shingle_size == 0 {
            return Err(CanonicalError::InvalidShingleSize {
                size: self.shingle_size,
            });
        }
        Ok(())
    }
}

impl Default for ShingleConfig {
    fn default() -> Self {
        Self {
            shingle_size: DEFAULT_SHINGLE_SIZE,
            seed: DEFAULT_SHINGLE_SEED,
        }
    }
}
