//! Shingle hashing.
//!
//! ```text
//! xxHash32(seed, shingle_bytes)
//! ```
//!
//! A 32-bit hash keeps shingle sets compact (4 bytes per shingle in the
//! store) and is what the MinHash XOR family operates on. Collisions only
//! ever merge two shingles, which can raise a similarity estimate slightly
//! but never lower it.

use xxhash_rust::xxh32::xxh32;

/// Hash the bytes of one shingle.
#[inline]
pub fn hash_shingle(bytes: &[u8], seed: u32) -> u32 {
    xxh32(bytes, seed)
}
