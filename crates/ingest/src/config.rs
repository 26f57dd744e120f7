//! Configuration for the ingestion phase.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime knobs of [`DocumentCache`](crate::DocumentCache).
///
/// None of these change which ids or shingle sets get stored; they only
/// affect throughput and log volume.
///
/// ```
/// use ingest::IngestConfig;
///
/// let cfg = IngestConfig::default().with_batch_size(256).with_parallel(false);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IngestConfig {
    /// Records pulled from the source before a parallel shingling pass.
    ///
    /// Default: `1024`
    pub batch_size: usize,

    /// Normalize and shingle each batch on the rayon pool.
    ///
    /// Id allocation and store writes stay serial either way.
    ///
    /// Default: `true`
    pub use_parallel: bool,

    /// Emit a `debug` progress event every this many stored records.
    /// `0` turns progress events off.
    ///
    /// Default: `1000`
    pub progress_every: usize,
}

impl IngestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn with_progress_every(mut self, progress_every: usize) -> Self {
        self.progress_every = progress_every;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        Ok(())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: 1024,
            use_parallel: true,
            progress_every: 1000,
        }
    }
}

/// Rejected [`IngestConfig`] values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("batch_size must be >= 1")]
    InvalidBatchSize,
}
