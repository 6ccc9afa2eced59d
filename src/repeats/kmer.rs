//! 2-bit packed k-mers.
//!
//! `A=0, C=1, G=2, T=3`; `N` packs to the sentinel 0 and k-mers overlapping an
//! `N` are reported as absent, so the sentinel never produces a seed.

use crate::utils::seq::AmbiguityMask;
use std::collections::HashMap;

pub const MAX_K: usize = 31;

#[inline]
pub fn encode_base(base: u8) -> u64 {
    match base {
        b'C' => 1,
        b'G' => 2,
        b'T' => 3,
        _ => 0,
    }
}

/// Packs `kmer` (at most 31 bases) into an integer, first base most significant.
pub fn pack(kmer: &[u8]) -> u64 {
    debug_assert!(kmer.len() <= MAX_K);
    kmer.iter().fold(0u64, |acc, &b| (acc << 2) | encode_base(b))
}

/// Codes of every k-mer of `seq`; `None` where the k-mer touches an `N`.
pub fn kmer_codes(seq: &[u8], k: usize) -> Vec<Option<u64>> {
    assert!(k > 0 && k <= MAX_K, "k-mer size must be in 1..=31");
    if seq.len() < k {
        return Vec::new();
    }
    let mask = AmbiguityMask::new(seq);
    let keep = (1u64 << (2 * k)) - 1;
    let mut codes = Vec::with_capacity(seq.len() - k + 1);
    let mut code = pack(&seq[..k - 1]);
    for start in 0..=seq.len() - k {
        code = ((code << 2) | encode_base(seq[start + k - 1])) & keep;
        codes.push(if mask.is_clean(start, start + k) {
            Some(code)
        } else {
            None
        });
    }
    codes
}

/// Sorted start positions of every clean k-mer, grouped by code.
pub struct KmerIndex {
    k: usize,
    positions: HashMap<u64, Vec<usize>>,
    codes: Vec<Option<u64>>,
}

impl KmerIndex {
    pub fn new(seq: &[u8], k: usize) -> Self {
        let codes = kmer_codes(seq, k);
        let mut positions: HashMap<u64, Vec<usize>> = HashMap::new();
        for (pos, code) in codes.iter().enumerate() {
            if let Some(code) = code {
                positions.entry(*code).or_default().push(pos);
            }
        }
        KmerIndex {
            k,
            positions,
            codes,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn code_at(&self, pos: usize) -> Option<u64> {
        self.codes.get(pos).copied().flatten()
    }

    /// Positions holding the same k-mer as `pos` within `[lo, hi]`, found by binary search.
    pub fn partners_in(&self, pos: usize, lo: usize, hi: usize) -> &[usize] {
        let Some(code) = self.code_at(pos) else {
            return &[];
        };
        let Some(list) = self.positions.get(&code) else {
            return &[];
        };
        let from = list.partition_point(|&p| p < lo);
        let to = list.partition_point(|&p| p <= hi);
        if from >= to {
            &[]
        } else {
            &list[from..to]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_orders_bases() {
        assert_eq!(pack(b"A"), 0);
        assert_eq!(pack(b"T"), 3);
        assert_eq!(pack(b"AC"), 1);
        assert_eq!(pack(b"CA"), 4);
        assert_eq!(pack(b"GT"), 0b1011);
    }

    #[test]
    fn rolling_codes_match_direct_packing() {
        let seq = b"ACGTTGCAAGGCTTACG";
        let codes = kmer_codes(seq, 5);
        assert_eq!(codes.len(), seq.len() - 4);
        for (i, code) in codes.iter().enumerate() {
            assert_eq!(*code, Some(pack(&seq[i..i + 5])));
        }
    }

    #[test]
    fn n_kmers_are_absent() {
        let codes = kmer_codes(b"AANAAAA", 3);
        assert_eq!(codes, vec![None, None, None, Some(0), Some(0)]);
    }

    #[test]
    fn index_finds_partners_in_range() {
        let seq = b"ACGTAACGTAACGTA";
        let index = KmerIndex::new(seq, 4);
        assert_eq!(index.partners_in(0, 1, 20), &[5, 10]);
        assert_eq!(index.partners_in(0, 6, 20), &[10]);
        assert!(index.partners_in(0, 11, 20).is_empty());
    }
}
