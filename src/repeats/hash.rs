//! Dual polynomial rolling hash with O(1) substring comparison.
//!
//! Both hashes work modulo the Mersenne prime 2^61-1 with independent bases;
//! two substrings are considered equal only when both hashes agree.

const MODULUS: u64 = (1 << 61) - 1;
const BASE_1: u64 = 0x1F3D_5B79_A2C4_E681 % MODULUS;
const BASE_2: u64 = 0x0B6D_9E3A_57F1_C243 % MODULUS;

#[inline]
fn mul_mod(a: u64, b: u64) -> u64 {
    let product = a as u128 * b as u128;
    let folded = (product & MODULUS as u128) + (product >> 61);
    let folded = folded as u64;
    if folded >= MODULUS {
        folded - MODULUS
    } else {
        folded
    }
}

#[inline]
fn add_mod(a: u64, b: u64) -> u64 {
    let sum = a + b;
    if sum >= MODULUS {
        sum - MODULUS
    } else {
        sum
    }
}

#[inline]
fn sub_mod(a: u64, b: u64) -> u64 {
    if a >= b {
        a - b
    } else {
        a + MODULUS - b
    }
}

struct PolyHash {
    prefix: Vec<u64>,
    powers: Vec<u64>,
}

impl PolyHash {
    fn new(seq: &[u8], base: u64) -> Self {
        let mut prefix = Vec::with_capacity(seq.len() + 1);
        let mut powers = Vec::with_capacity(seq.len() + 1);
        prefix.push(0);
        powers.push(1);
        for (i, &b) in seq.iter().enumerate() {
            // Offset symbols so no base hashes to zero
            prefix.push(add_mod(mul_mod(prefix[i], base), b as u64 + 1));
            powers.push(mul_mod(powers[i], base));
        }
        PolyHash { prefix, powers }
    }

    #[inline]
    fn range(&self, start: usize, end: usize) -> u64 {
        sub_mod(
            self.prefix[end],
            mul_mod(self.prefix[start], self.powers[end - start]),
        )
    }
}

/// Prefix-hash tables for one sequence.
pub struct SequenceHasher {
    first: PolyHash,
    second: PolyHash,
}

impl SequenceHasher {
    pub fn new(seq: &[u8]) -> Self {
        SequenceHasher {
            first: PolyHash::new(seq, BASE_1),
            second: PolyHash::new(seq, BASE_2),
        }
    }

    pub fn len(&self) -> usize {
        self.first.prefix.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Both hashes of `[start, end)`.
    #[inline]
    pub fn substring(&self, start: usize, end: usize) -> (u64, u64) {
        debug_assert!(start <= end && end <= self.len());
        (self.first.range(start, end), self.second.range(start, end))
    }

    /// Equality of `self[a..a+len]` and `other[b..b+len]`; both hashes must agree.
    #[inline]
    pub fn same(&self, a: usize, other: &SequenceHasher, b: usize, len: usize) -> bool {
        self.substring(a, a + len) == other.substring(b, b + len)
    }
}

/// Largest `len` in `[known, limit]` for which `matches(len)` holds, given that
/// `matches(known)` holds and the predicate is monotone (true for every value
/// below a true value).
pub fn max_matching_len(known: usize, limit: usize, matches: impl Fn(usize) -> bool) -> usize {
    let mut lo = known;
    let mut hi = limit;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if matches(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_dna(rng: &mut StdRng, len: usize) -> Vec<u8> {
        (0..len).map(|_| b"ACGT"[rng.random_range(0..4)]).collect()
    }

    #[test]
    fn identical_substrings_always_match() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let len = rng.random_range(1..200);
            let block = random_dna(&mut rng, len);
            let mut left = random_dna(&mut rng, 17);
            left.extend_from_slice(&block);
            let mut right = block.clone();
            right.extend_from_slice(&random_dna(&mut rng, 5));
            let h_left = SequenceHasher::new(&left);
            let h_right = SequenceHasher::new(&right);
            assert!(h_left.same(17, &h_right, 0, len));
        }
    }

    #[test]
    fn single_base_mutations_mismatch() {
        let mut rng = StdRng::seed_from_u64(7);
        let trials = 20_000;
        let mut collisions = 0;
        for _ in 0..trials {
            let len = rng.random_range(8..120);
            let original = random_dna(&mut rng, len);
            let mut mutated = original.clone();
            let pos = rng.random_range(0..len);
            let choices: Vec<u8> = b"ACGT"
                .iter()
                .copied()
                .filter(|&b| b != original[pos])
                .collect();
            mutated[pos] = choices[rng.random_range(0..3)];
            let h1 = SequenceHasher::new(&original);
            let h2 = SequenceHasher::new(&mutated);
            if h1.same(0, &h2, 0, len) {
                collisions += 1;
            }
        }
        assert_eq!(collisions, 0);
    }

    #[test]
    fn substring_hash_is_position_independent() {
        let seq = b"ACGTACGTTTACGTACGT";
        let hasher = SequenceHasher::new(seq);
        assert_eq!(hasher.substring(0, 4), hasher.substring(4, 8));
        assert_eq!(hasher.substring(10, 18), hasher.substring(0, 8));
        assert_ne!(hasher.substring(0, 4), hasher.substring(1, 5));
        assert_eq!(hasher.substring(3, 3), (0, 0));
    }

    #[test]
    fn binary_search_finds_largest_true() {
        assert_eq!(max_matching_len(3, 10, |l| l <= 7), 7);
        assert_eq!(max_matching_len(3, 10, |l| l <= 3), 3);
        assert_eq!(max_matching_len(3, 10, |_| true), 10);
        assert_eq!(max_matching_len(5, 5, |_| true), 5);
    }
}
