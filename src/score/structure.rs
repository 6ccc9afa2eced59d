use super::ScoringStrategy;
use crate::motif::{Candidate, MotifDetails, Subclass};
use crate::utils::seq::{base_fraction, gc_fraction, run_lengths};

const CRUCIFORM_SPACER_DECAY: f64 = 20.0;
const MIRROR_SPACER_DECAY: f64 = 4.0;

/// `arm_structure`: stem arm length weighted by arm composition and decaying
/// with the loop length. Cruciform stems gain from GC-rich arms, triplex
/// mirror repeats from strand purity.
#[derive(Debug, Clone, Copy)]
pub struct ArmStructureScore;

impl ScoringStrategy for ArmStructureScore {
    fn method(&self) -> &'static str {
        "arm_structure"
    }

    fn raw_score(&self, candidate: &Candidate, slice: &[u8]) -> f64 {
        let MotifDetails::Stem {
            arm_len,
            spacer,
            purity,
        } = candidate.details
        else {
            return 0.0;
        };
        let arm = arm_len as f64;
        let spacer = spacer as f64;
        match candidate.subclass {
            Subclass::MirrorRepeat => arm * purity * (-spacer / MIRROR_SPACER_DECAY).exp(),
            _ => {
                let left_arm = &slice[..arm_len.min(slice.len())];
                arm * (1.0 + 0.5 * gc_fraction(left_arm)) * (-spacer / CRUCIFORM_SPACER_DECAY).exp()
            }
        }
    }
}

/// `curvature_phasing`: A/T-tract content of the region, with a bonus per
/// additional phased tract.
#[derive(Debug, Clone, Copy)]
pub struct CurvatureScore;

impl ScoringStrategy for CurvatureScore {
    fn method(&self) -> &'static str {
        "curvature_phasing"
    }

    fn raw_score(&self, _candidate: &Candidate, slice: &[u8]) -> f64 {
        let mut tracts = run_lengths(slice, b'A', 3);
        tracts.extend(run_lengths(slice, b'T', 3));
        if tracts.is_empty() {
            return 0.0;
        }
        let tract_bases: usize = tracts.iter().sum();
        tract_bases as f64 * (1.0 + 0.1 * (tracts.len() - 1) as f64)
    }
}

/// `rloop_density`: G density of the initiation zone plus the elongation zone
/// length in hundreds of bases weighted by its own G density.
#[derive(Debug, Clone, Copy)]
pub struct RLoopScore;

impl ScoringStrategy for RLoopScore {
    fn method(&self) -> &'static str {
        "rloop_density"
    }

    fn raw_score(&self, candidate: &Candidate, slice: &[u8]) -> f64 {
        let riz_len = match candidate.details {
            MotifDetails::Zones { riz_len, .. } => riz_len.min(slice.len()),
            _ => 0,
        };
        let (riz, rez) = slice.split_at(riz_len);
        2.0 * base_fraction(riz, b'G') + base_fraction(rez, b'G') * rez.len() as f64 / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::seq::reverse_complement;

    #[test]
    fn cruciform_arm_score() {
        let arm = b"ATGCGTACCGATCAG";
        let mut seq = arm.to_vec();
        seq.extend_from_slice(b"TTTTT");
        seq.extend_from_slice(&reverse_complement(arm));
        let candidate = Candidate::from_span(
            Subclass::InvertedRepeat,
            0,
            seq.len(),
            MotifDetails::Stem {
                arm_len: 15,
                spacer: 5,
                purity: 1.0,
            },
        );
        let raw = ArmStructureScore.raw_score(&candidate, &seq);
        let expected = 15.0 * (1.0 + 0.5 * 8.0 / 15.0) * (-0.25f64).exp();
        assert!((raw - expected).abs() < 1e-9);
    }

    #[test]
    fn mirror_spacer_penalty_is_steeper() {
        let stem = |subclass, spacer| {
            Candidate::from_span(
                subclass,
                0,
                24 + spacer,
                MotifDetails::Stem {
                    arm_len: 12,
                    spacer,
                    purity: 1.0,
                },
            )
        };
        let seq = vec![b'A'; 40];
        let mirror = ArmStructureScore.raw_score(&stem(Subclass::MirrorRepeat, 4), &seq);
        assert!((mirror - 12.0 * (-1.0f64).exp()).abs() < 1e-9);
        let tight = ArmStructureScore.raw_score(&stem(Subclass::MirrorRepeat, 0), &seq);
        assert_eq!(tight, 12.0);
    }

    #[test]
    fn curvature_counts_tracts() {
        let raw = CurvatureScore.raw_score(
            &Candidate::from_span(Subclass::GlobalCurvature, 0, 1, MotifDetails::None),
            b"AAAAAGCGCCTTTTTGCGCCAAAAA",
        );
        assert!((raw - 15.0 * 1.2).abs() < 1e-9);
    }
}
