//! Nucleotide helpers shared by the detectors and the scoring strategies.

/// True when `seq` is non-empty and contains only upper-case `A`, `C`, `G`, `T`, `N`.
pub fn is_valid_dna(seq: &[u8]) -> bool {
    !seq.is_empty() && seq.iter().all(|b| matches!(b, b'A' | b'C' | b'G' | b'T' | b'N'))
}

#[inline]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => other,
    }
}

/// Watson-Crick pairing; `N` pairs with nothing.
#[inline]
pub fn pairs_with(a: u8, b: u8) -> bool {
    a != b'N' && b != b'N' && complement(a) == b
}

pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

#[inline]
pub fn is_purine(base: u8) -> bool {
    matches!(base, b'A' | b'G')
}

#[inline]
pub fn is_pyrimidine(base: u8) -> bool {
    matches!(base, b'C' | b'T')
}

/// Fraction of G+C over the slice, in [0, 1].
pub fn gc_fraction(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc = seq.iter().filter(|&&b| b == b'G' || b == b'C').count();
    gc as f64 / seq.len() as f64
}

/// GC percentage rounded to two decimals, as reported in motif records.
pub fn gc_percent(seq: &[u8]) -> f64 {
    (gc_fraction(seq) * 10_000.0).round() / 100.0
}

pub fn base_fraction(seq: &[u8], base: u8) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    seq.iter().filter(|&&b| b == base).count() as f64 / seq.len() as f64
}

/// Lengths of the maximal runs of `base` that are at least `min_len` long.
pub fn run_lengths(seq: &[u8], base: u8, min_len: usize) -> Vec<usize> {
    let mut runs = Vec::new();
    let mut current = 0;
    for &b in seq {
        if b == base {
            current += 1;
        } else {
            if current >= min_len {
                runs.push(current);
            }
            current = 0;
        }
    }
    if current >= min_len {
        runs.push(current);
    }
    runs
}

/// Prefix counts of `N` so that any window can be tested for ambiguity in O(1).
pub struct AmbiguityMask {
    prefix: Vec<u32>,
}

impl AmbiguityMask {
    pub fn new(seq: &[u8]) -> Self {
        let mut prefix = Vec::with_capacity(seq.len() + 1);
        prefix.push(0);
        let mut count = 0u32;
        for &b in seq {
            if b == b'N' {
                count += 1;
            }
            prefix.push(count);
        }
        Self { prefix }
    }

    /// True when `[start, end)` contains no `N`.
    #[inline]
    pub fn is_clean(&self, start: usize, end: usize) -> bool {
        self.prefix[end] == self.prefix[start]
    }
}
