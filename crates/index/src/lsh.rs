//! Banded LSH index over MinHash signatures.

use hashbrown::HashMap;
use xxhash_rust::xxh32::xxh32;

use crate::{DocId, IndexError, LshParams};

/// `bucket id -> doc ids` for every band.
///
/// A band's bucket id is xxHash32 of the band's row bytes, seeded with the
/// band number so identical rows in different bands never share a bucket
/// space. Inserting the same document twice duplicates it in bucket lists;
/// callers insert each document at most once.
#[derive(Debug, Clone)]
pub struct LshIndex {
    params: LshParams,
    bands: Vec<HashMap<u32, Vec<DocId>>>,
    len: usize,
}

impl LshIndex {
    pub fn new(params: LshParams) -> Self {
        Self {
            params,
            bands: (0..params.bands).map(|_| HashMap::new()).collect(),
            len: 0,
        }
    }

    pub fn params(&self) -> LshParams {
        self.params
    }

    /// Number of inserted documents.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of non-empty buckets across all bands.
    pub fn bucket_count(&self) -> usize {
        self.bands.iter().map(HashMap::len).sum()
    }

    /// Register `doc_id` in one bucket per band.
    pub fn insert(&mut self, doc_id: DocId, signature: &[u32]) -> Result<(), IndexError> {
        self.check_width(signature)?;
        let rows = self.params.rows;
        for (band_id, (band, band_rows)) in self
            .bands
            .iter_mut()
            .zip(signature.chunks_exact(rows))
            .enumerate()
        {
            band.entry(bucket_id(band_rows, band_id))
                .or_default()
                .push(doc_id);
        }
        self.len += 1;
        Ok(())
    }

    /// Every stored document sharing at least one band bucket with
    /// `signature`, sorted ascending and deduplicated.
    pub fn get_candidates(&self, signature: &[u32]) -> Result<Vec<DocId>, IndexError> {
        self.check_width(signature)?;
        let mut candidates = Vec::new();
        for (band_id, (band, band_rows)) in self
            .bands
            .iter()
            .zip(signature.chunks_exact(self.params.rows))
            .enumerate()
        {
            if let Some(bucket) = band.get(&bucket_id(band_rows, band_id)) {
                candidates.extend_from_slice(bucket);
            }
        }
        candidates.sort_unstable();
        candidates.dedup();
        Ok(candidates)
    }

    fn check_width(&self, signature: &[u32]) -> Result<(), IndexError> {
        let expected = self.params.signature_size();
        if signature.len() != expected {
            return Err(IndexError::SignatureLength {
                expected,
                got: signature.len(),
            });
        }
        Ok(())
    }
}

#[inline]
fn bucket_id(band_rows: &[u32], band_id: usize) -> u32 {
    xxh32(bytemuck::cast_slice(band_rows), band_id as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> LshParams {
        LshParams { bands: 4, rows: 2 }
    }

    #[test]
    fn empty_index_has_no_candidates() {
        let lsh = LshIndex::new(params());
        assert!(lsh.is_empty());
        assert!(lsh.get_candidates(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap().is_empty());
    }

    #[test]
    fn insert_lands_in_one_bucket_per_band() {
        let mut lsh = LshIndex::new(params());
        lsh.insert(3, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(lsh.len(), 1);
        assert_eq!(lsh.bucket_count(), 4);
        for band in &lsh.bands {
            let total: usize = band.values().map(Vec::len).sum();
            assert_eq!(total, 1);
        }
    }

    #[test]
    fn one_shared_band_is_enough() {
        let mut lsh = LshIndex::new(params());
        lsh.insert(0, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        lsh.insert(1, &[9, 9, 9, 9, 9, 9, 7, 8]).unwrap();
        lsh.insert(2, &[0, 0, 0, 0, 0, 0, 0, 0]).unwrap();

        let candidates = lsh.get_candidates(&[4, 4, 4, 4, 4, 4, 7, 8]).unwrap();
        assert_eq!(candidates, vec![0, 1]);
    }

    #[test]
    fn candidates_sorted_and_unique() {
        let mut lsh = LshIndex::new(params());
        let sig = [5, 6, 7, 8, 9, 10, 11, 12];
        for id in [9, 2, 5] {
            lsh.insert(id, &sig).unwrap();
        }
        assert_eq!(lsh.get_candidates(&sig).unwrap(), vec![2, 5, 9]);
    }

    #[test]
    fn bands_have_independent_bucket_spaces() {
        let mut lsh = LshIndex::new(params());
        // Rows (1, 1) only in band 0 for the stored doc, only in band 1 for the query.
        lsh.insert(0, &[1, 1, 2, 2, 3, 3, 4, 4]).unwrap();
        let candidates = lsh.get_candidates(&[0, 0, 1, 1, 5, 5, 6, 6]).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn wrong_width_rejected() {
        let mut lsh = LshIndex::new(params());
        assert_eq!(
            lsh.insert(0, &[1, 2, 3]),
            Err(IndexError::SignatureLength { expected: 8, got: 3 })
        );
        assert!(lsh.get_candidates(&[1; 9]).is_err());
    }
}
