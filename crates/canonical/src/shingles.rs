//! Token shingling.
//!
//! Token boundaries are offset 0 plus the offset of every whitespace byte
//! after it. A shingle spans `shingle_size + 1` consecutive boundaries, i.e.
//! `shingle_size` tokens, with a single leading whitespace byte trimmed. The
//! end of the text is not a boundary, so the trailing token only contributes
//! through the degenerate case below.
//!
//! When the text has too few boundaries to fill one window, the whole text
//! (leading whitespace byte trimmed) becomes the only shingle.

use crate::config::ShingleConfig;
use crate::hash::hash_shingle;
use crate::normalize::is_space_byte;

/// Sorted, duplicate-free shingle hashes of one document.
pub type ShingleSet = Vec<u32>;

/// Extract the shingle set of already normalized text.
///
/// The caller must not pass empty text; it still yields one shingle (the
/// hash of the empty string) but carries no content.
pub fn generate_shingles(text: &str, cfg: &ShingleConfig) -> ShingleSet {
    let bytes = text.as_bytes();
    let k = cfg.shingle_size;

    let mut boundaries = Vec::with_capacity(bytes.len() / 4 + 1);
    boundaries.push(0usize);
    boundaries.extend(
        bytes
            .iter()
            .enumerate()
            .skip(1)
            .filter(|&(_, &b)| is_space_byte(b))
            .map(|(idx, _)| idx),
    );

    let mut shingles: ShingleSet = if boundaries.len() <= k {
        vec![hash_shingle(trim_leading_space(bytes), cfg.seed)]
    } else {
        boundaries
            .windows(k + 1)
            .map(|window| {
                let (start, end) = (window[0], window[k]);
                hash_shingle(trim_leading_space(&bytes[start..end]), cfg.seed)
            })
            .collect()
    };

    shingles.sort_unstable();
    shingles.dedup();
    shingles
}

/// Whether `shingles` is strictly ascending (sorted and duplicate-free).
pub fn is_canonical(shingles: &[u32]) -> bool {
    shingles.windows(2).all(|pair| pair[0] < pair[1])
}

#[inline]
fn trim_leading_space(bytes: &[u8]) -> &[u8] {
    match bytes.first() {
        Some(&b) if is_space_byte(b) => &bytes[1..],
        _ => bytes,
    }
}
