use super::ScoringStrategy;
use crate::motif::{Candidate, MotifDetails, Subclass};
use crate::utils::seq::gc_fraction;

const EGZ_BONUS: f64 = 1.5;
const GC_BONUS: f64 = 0.25;
const DIRECT_SPACER_DECAY: f64 = 5.0;

/// `repeat_count`: grows with the repeated length, with a GC bonus for STRs
/// and direct repeats and an exponential spacer penalty for direct repeats.
#[derive(Debug, Clone, Copy)]
pub struct RepeatCountScore;

impl ScoringStrategy for RepeatCountScore {
    fn method(&self) -> &'static str {
        "repeat_count"
    }

    fn raw_score(&self, candidate: &Candidate, slice: &[u8]) -> f64 {
        let gc_bonus = 1.0 + GC_BONUS * gc_fraction(slice);
        match (&candidate.subclass, &candidate.details) {
            (Subclass::DirectRepeat, MotifDetails::Spaced { unit_len, spacer }) => {
                *unit_len as f64 * 2.0 * gc_bonus * (-(*spacer as f64) / DIRECT_SPACER_DECAY).exp()
            }
            (subclass, MotifDetails::Tandem { unit, copies, .. }) => {
                let repeated = (*copies * unit.len()) as f64;
                match subclass {
                    Subclass::Egz => repeated * EGZ_BONUS,
                    Subclass::StickyDna => repeated,
                    _ => repeated * gc_bonus,
                }
            }
            // Candidates without repeat details score on their span
            _ => slice.len() as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_score_includes_gc_bonus() {
        let candidate = Candidate::from_span(
            Subclass::Str,
            0,
            14,
            MotifDetails::Tandem {
                unit: "CA".to_string(),
                copies: 7,
                partial: 0,
            },
        );
        let raw = RepeatCountScore.raw_score(&candidate, b"CACACACACACACA");
        assert!((raw - 14.0 * 1.125).abs() < 1e-12);
    }

    #[test]
    fn direct_repeat_spacer_decays() {
        let block = b"ACGTTGCATGCA";
        let adjacent = Candidate::from_span(
            Subclass::DirectRepeat,
            0,
            24,
            MotifDetails::Spaced {
                unit_len: 12,
                spacer: 0,
            },
        );
        let spaced = Candidate::from_span(
            Subclass::DirectRepeat,
            0,
            29,
            MotifDetails::Spaced {
                unit_len: 12,
                spacer: 5,
            },
        );
        let a = RepeatCountScore.raw_score(&adjacent, &block.repeat(2));
        let mut seq = block.to_vec();
        seq.extend_from_slice(b"TTTTT");
        seq.extend_from_slice(block);
        let s = RepeatCountScore.raw_score(&spaced, &seq);
        assert!(s < a);
        assert!((a - 24.0 * 1.125).abs() < 1e-12);
    }

    #[test]
    fn egz_uses_copy_bonus() {
        let candidate = Candidate::from_span(
            Subclass::Egz,
            0,
            12,
            MotifDetails::Tandem {
                unit: "CGG".to_string(),
                copies: 4,
                partial: 0,
            },
        );
        assert_eq!(RepeatCountScore.raw_score(&candidate, b"CGGCGGCGGCGG"), 18.0);
    }
}
