use super::hash::{max_matching_len, SequenceHasher};
use super::kmer::kmer_codes;
use super::RepeatParams;
use crate::motif::{Candidate, MotifDetails, Subclass};
use crate::scan::{DetectorContext, DetectorError};
use crate::utils::seq::{is_purine, is_pyrimidine, pairs_with, reverse_complement};

/// How the right arm relates to the left arm of a stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StemKind {
    /// Right arm is the reverse complement of the left arm (cruciform).
    Inverted,
    /// Right arm is the plain reversal of the left arm (triplex precursor).
    Mirror,
}

impl StemKind {
    fn partner_strand(self, seq: &[u8]) -> Vec<u8> {
        match self {
            StemKind::Inverted => reverse_complement(seq),
            StemKind::Mirror => seq.iter().rev().copied().collect(),
        }
    }

    /// Whether the innermost spacer bases could themselves extend the stem.
    fn inner_pairs(self, left: u8, right: u8) -> bool {
        match self {
            StemKind::Inverted => pairs_with(left, right),
            StemKind::Mirror => left != b'N' && left == right,
        }
    }

    fn name(self) -> &'static str {
        match self {
            StemKind::Inverted => "inverted_repeat",
            StemKind::Mirror => "mirror_repeat",
        }
    }
}

struct StemLimits {
    min_arm: usize,
    max_arm: usize,
    max_spacer: usize,
}

/// Homopurine or homopyrimidine fraction of `arm`, whichever is larger.
pub fn strand_purity(arm: &[u8]) -> f64 {
    if arm.is_empty() {
        return 0.0;
    }
    let purines = arm.iter().filter(|&&b| is_purine(b)).count();
    let pyrimidines = arm.iter().filter(|&&b| is_pyrimidine(b)).count();
    purines.max(pyrimidines) as f64 / arm.len() as f64
}

/// Tables shared by the stem searches over one sequence.
pub struct StemIndex<'a> {
    seq: &'a [u8],
    kind: StemKind,
    k: usize,
    forward_codes: Vec<Option<u64>>,
    partner_codes: Vec<Option<u64>>,
    forward_hash: SequenceHasher,
    partner_hash: SequenceHasher,
    /// Clean (non-N) bases ending just before each position.
    clean_left: Vec<usize>,
    /// Clean bases starting at each position.
    clean_right: Vec<usize>,
}

impl<'a> StemIndex<'a> {
    pub fn new(seq: &'a [u8], kind: StemKind, k: usize) -> Self {
        let partner = kind.partner_strand(seq);
        let n = seq.len();
        let mut clean_left = vec![0; n + 1];
        for i in 0..n {
            clean_left[i + 1] = if seq[i] == b'N' { 0 } else { clean_left[i] + 1 };
        }
        let mut clean_right = vec![0; n + 1];
        for i in (0..n).rev() {
            clean_right[i] = if seq[i] == b'N' { 0 } else { clean_right[i + 1] + 1 };
        }
        StemIndex {
            seq,
            kind,
            k,
            forward_codes: kmer_codes(seq, k),
            partner_codes: kmer_codes(&partner, k),
            forward_hash: SequenceHasher::new(seq),
            partner_hash: SequenceHasher::new(&partner),
            clean_left,
            clean_right,
        }
    }

    /// Whether a left arm `[left_end - len, left_end)` and right arm
    /// `[right_start, right_start + len)` form a perfect stem.
    pub fn arms_match(&self, left_end: usize, right_start: usize, len: usize) -> bool {
        let n = self.seq.len();
        if len > left_end || right_start + len > n || left_end > right_start {
            return false;
        }
        self.forward_hash.same(
            left_end - len,
            &self.partner_hash,
            n - right_start - len,
            len,
        )
    }

    /// Whether the innermost spacer bases pair, so the stem continues inward.
    pub fn extends_inward(&self, left_end: usize, right_start: usize) -> bool {
        right_start >= left_end + 2
            && self
                .kind
                .inner_pairs(self.seq[left_end], self.seq[right_start - 1])
    }

    /// Longest arm around the spacer `[left_end, right_start)`, or `None` when the
    /// inner k bases do not pair.
    pub fn max_arm(&self, left_end: usize, right_start: usize, max_arm: usize) -> Option<usize> {
        let n = self.seq.len();
        let k = self.k;
        if left_end < k || right_start + k > n || left_end > right_start {
            return None;
        }
        let seed = self.forward_codes[left_end - k]?;
        let partner = self.partner_codes[n - right_start - k]?;
        if seed != partner {
            return None;
        }
        let limit = self.clean_left[left_end]
            .min(self.clean_right[right_start])
            .min(max_arm)
            .max(k);
        Some(max_matching_len(k, limit, |len| {
            self.arms_match(left_end, right_start, len)
        }))
    }
}

fn find_stems(
    seq: &[u8],
    kind: StemKind,
    limits: StemLimits,
    seed_k: usize,
    ctx: &DetectorContext,
    accept: impl Fn(&[u8]) -> Option<f64>,
    subclass: Subclass,
) -> Result<Vec<Candidate>, DetectorError> {
    let n = seq.len();
    let k = seed_k.min(limits.min_arm).max(1);
    if n < 2 * limits.min_arm {
        return Ok(Vec::new());
    }
    let index = StemIndex::new(seq, kind, k);
    let mut found = Vec::new();

    for right_start in k..=n - k {
        if right_start % 512 == 0 {
            ctx.check(kind.name())?;
        }
        for spacer in 0..=limits.max_spacer.min(right_start - k) {
            let left_end = right_start - spacer;
            // Stems that continue into the spacer are reported from the inner anchor
            if index.extends_inward(left_end, right_start) {
                continue;
            }
            let Some(arm_len) = index.max_arm(left_end, right_start, limits.max_arm) else {
                continue;
            };
            if arm_len < limits.min_arm {
                continue;
            }
            let start = left_end - arm_len;
            let Some(purity) = accept(&seq[start..left_end]) else {
                continue;
            };
            found.push(Candidate::from_span(
                subclass,
                start,
                right_start + arm_len,
                MotifDetails::Stem {
                    arm_len,
                    spacer,
                    purity,
                },
            ));
        }
    }
    found.sort_by_key(|c| (c.start, c.end));
    Ok(found)
}

/// Inverted repeats able to extrude a cruciform.
pub fn find_inverted_repeats(
    seq: &[u8],
    params: &RepeatParams,
    ctx: &DetectorContext,
) -> Result<Vec<Candidate>, DetectorError> {
    let limits = StemLimits {
        min_arm: params.inverted_min_arm,
        max_arm: params.inverted_max_arm,
        max_spacer: params.inverted_max_spacer,
    };
    find_stems(
        seq,
        StemKind::Inverted,
        limits,
        params.stem_seed_k,
        ctx,
        |_| Some(1.0),
        Subclass::InvertedRepeat,
    )
}

/// Mirror repeats whose arms are homopurine or homopyrimidine enough to fold
/// into an intramolecular triplex.
pub fn find_mirror_repeats(
    seq: &[u8],
    params: &RepeatParams,
    ctx: &DetectorContext,
) -> Result<Vec<Candidate>, DetectorError> {
    let limits = StemLimits {
        min_arm: params.mirror_min_arm,
        max_arm: params.mirror_max_arm,
        max_spacer: params.mirror_max_spacer,
    };
    let min_purity = params.mirror_min_purity;
    find_stems(
        seq,
        StemKind::Mirror,
        limits,
        params.stem_seed_k,
        ctx,
        |arm| {
            let purity = strand_purity(arm);
            (purity >= min_purity).then_some(purity)
        },
        Subclass::MirrorRepeat,
    )
}
