//! Exact repeats whose unit or spacer length is a free parameter: short tandem
//! repeats, direct repeats, inverted repeats (cruciforms) and mirror repeats
//! (triplex precursors).

mod direct;
mod hash;
mod kmer;
mod stem;
mod tandem;

pub use direct::find_direct_repeats;
pub use hash::{max_matching_len, SequenceHasher};
pub use kmer::{kmer_codes, pack, KmerIndex};
pub use stem::{find_inverted_repeats, find_mirror_repeats, strand_purity, StemIndex, StemKind};
pub use tandem::find_strs;

use crate::motif::Candidate;
use crate::scan::{Detector, DetectorContext, DetectorError};

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatParams {
    pub str_max_unit: usize,
    pub str_min_copies: usize,
    pub str_min_len: usize,
    /// Seed size of the direct repeat k-mer index, capped at `direct_min_unit`.
    pub seed_k: usize,
    pub direct_min_unit: usize,
    pub direct_max_unit: usize,
    pub direct_max_spacer: usize,
    /// Seed size for stem anchors, capped at the arm minimum.
    pub stem_seed_k: usize,
    pub inverted_min_arm: usize,
    pub inverted_max_arm: usize,
    pub inverted_max_spacer: usize,
    pub mirror_min_arm: usize,
    pub mirror_max_arm: usize,
    pub mirror_max_spacer: usize,
    pub mirror_min_purity: f64,
}

impl Default for RepeatParams {
    fn default() -> Self {
        RepeatParams {
            str_max_unit: 9,
            str_min_copies: 2,
            str_min_len: 10,
            seed_k: 10,
            direct_min_unit: 10,
            direct_max_unit: 300,
            direct_max_spacer: 10,
            stem_seed_k: 6,
            inverted_min_arm: 6,
            inverted_max_arm: 100,
            inverted_max_spacer: 100,
            mirror_min_arm: 10,
            mirror_max_arm: 100,
            mirror_max_spacer: 8,
            mirror_min_purity: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatFamily {
    Str,
    Direct,
    Inverted,
    Mirror,
}

impl RepeatFamily {
    pub const ALL: [RepeatFamily; 4] = [
        RepeatFamily::Str,
        RepeatFamily::Direct,
        RepeatFamily::Inverted,
        RepeatFamily::Mirror,
    ];
}

/// One exact-repeat sub-detector bound to its parameters.
#[derive(Debug, Clone)]
pub struct ExactRepeatMatcher {
    family: RepeatFamily,
    params: RepeatParams,
}

impl ExactRepeatMatcher {
    pub fn new(family: RepeatFamily, params: RepeatParams) -> Self {
        ExactRepeatMatcher { family, params }
    }

    pub fn family(&self) -> RepeatFamily {
        self.family
    }
}

impl Detector for ExactRepeatMatcher {
    fn name(&self) -> &'static str {
        match self.family {
            RepeatFamily::Str => "str",
            RepeatFamily::Direct => "direct_repeat",
            RepeatFamily::Inverted => "inverted_repeat",
            RepeatFamily::Mirror => "mirror_repeat",
        }
    }

    fn detect(&self, seq: &[u8], ctx: &DetectorContext) -> Result<Vec<Candidate>, DetectorError> {
        match self.family {
            RepeatFamily::Str => find_strs(seq, &self.params, ctx),
            RepeatFamily::Direct => find_direct_repeats(seq, &self.params, ctx),
            RepeatFamily::Inverted => find_inverted_repeats(seq, &self.params, ctx),
            RepeatFamily::Mirror => find_mirror_repeats(seq, &self.params, ctx),
        }
    }
}
