use thiserror::Error;

/// Errors raised by the canonical layer.
///
/// Normalization and shingling themselves cannot fail; only configuration is
/// checked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("invalid config: shingle_size must be >= 1 (got {size})")]
    InvalidShingleSize { size: usize },
}
