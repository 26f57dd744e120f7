//! # MinHash signatures
//!
//! Compact, similarity-preserving fingerprints of shingle sets.
//!
//! ## Contract
//!
//! - Input is a canonical shingle set (sorted, unique `u32` hashes) produced
//!   upstream. Nothing here reads text.
//! - [`MinHasher`] owns the coefficient table. It is built once per run from
//!   a seed and passed to every signature computation; there is no hidden
//!   global state, so alternate seeds are easy to test.
//! - For the same shingle set and the same [`MinHashConfig`], the signature
//!   is bit identical, with or without parallelism.
//!
//! ## Algorithm
//!
//! For coefficient `c_i`, row `i` of the signature is
//! `min over shingles s of (s XOR c_i)`. The probability that two signatures
//! agree on a row approximates the Jaccard similarity of the two sets, which
//! is what LSH banding exploits. Rows are independent, so they are computed
//! with rayon when `use_parallel` is set.
//!
//! [`calculate_similarity`] is the exact Jaccard similarity used to verify
//! LSH candidates.
//!
//! ```
//! use perceptual::{calculate_similarity, MinHashConfig, MinHasher};
//!
//! let hasher = MinHasher::new(&MinHashConfig::default()).unwrap();
//! let a = vec![3u32, 17, 256, 9001];
//! let b = vec![3u32, 17, 256, 9002];
//!
//! assert_eq!(hasher.signature(&a), hasher.signature(&a));
//! assert_eq!(calculate_similarity(&a, &b), 3.0 / 5.0);
//! ```

mod config;
mod minhash;
mod similarity;

pub use crate::config::{MinHashConfig, PerceptualError, DEFAULT_MINHASH_SEED, SIGNATURE_SIZE};
pub use crate::minhash::{MinHashSignature, MinHasher};
pub use crate::similarity::calculate_similarity;
