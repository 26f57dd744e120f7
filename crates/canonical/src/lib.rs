//! Canonical text layer for near-duplicate detection.
//!
//! Turns a raw document body into its canonical shingle set: the sorted,
//! duplicate-free list of 32-bit hashes of every overlapping token n-gram.
//! Every later stage (signatures, LSH banding, exact similarity) works on
//! shingle sets only and never looks at text again.
//!
//! ## What we do
//!
//! - Whitespace runs collapse and ASCII letters are lowercased
//!   ([`normalize_text`]). Nothing else is touched: no Unicode folding, no
//!   punctuation handling.
//! - Tokens are whitespace delimited. Each window of `shingle_size` tokens is
//!   hashed with seeded xxHash32 ([`generate_shingles`]).
//!
//! ## Invariants worth knowing
//!
//! - [`normalize_text`] is idempotent.
//! - A shingle set is strictly ascending. Set intersection is a linear merge.
//! - Any non-empty text yields at least one shingle, even when it has fewer
//!   tokens than `shingle_size`.
//! - Output depends only on the text and the [`ShingleConfig`].
//!
//! ```
//! use canonical::{shingle_text, ShingleConfig};
//!
//! let cfg = ShingleConfig::default();
//! let a = shingle_text("The  quick brown\tfox jumps", &cfg);
//! let b = shingle_text("the quick brown fox jumps", &cfg);
//! assert_eq!(a, b);
//! ```

mod config;
mod error;
mod hash;
mod normalize;
mod shingles;

pub use crate::config::{ShingleConfig, DEFAULT_SHINGLE_SEED, DEFAULT_SHINGLE_SIZE};
pub use crate::error::CanonicalError;
pub use crate::hash::hash_shingle;
pub use crate::normalize::{is_space, normalize_text};
pub use crate::shingles::{generate_shingles, is_canonical, ShingleSet};

/// Normalize raw text and extract its shingle set in one call.
pub fn shingle_text(raw: &str, cfg: &ShingleConfig) -> ShingleSet {
    generate_shingles(&normalize_text(raw), cfg)
}
