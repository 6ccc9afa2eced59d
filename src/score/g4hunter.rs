use super::ScoringStrategy;
use crate::motif::{Candidate, Subclass};
use crate::utils::seq::run_lengths;

/// Sum of squared lengths of the maximal `base` runs of two or more, over the
/// window length. Windows holding runs of both G and C of two or more cancel
/// to zero since the two strands compete for the structure.
pub fn g4hunter_runs(slice: &[u8], base: u8) -> f64 {
    if slice.is_empty() {
        return 0.0;
    }
    let partner = if base == b'G' { b'C' } else { b'G' };
    let runs = run_lengths(slice, base, 2);
    if runs.is_empty() || !run_lengths(slice, partner, 2).is_empty() {
        return 0.0;
    }
    let total: usize = runs.iter().map(|r| r * r).sum();
    total as f64 / slice.len() as f64
}

/// Relative stability of each subclass, applied to the run score so that the
/// better folded variant wins between overlapping calls of one class.
fn stability(subclass: Subclass) -> f64 {
    use Subclass::*;
    match subclass {
        MultimericG4 | CanonicalG4 | CanonicalIMotif => 1.0,
        BulgedG4 => 0.85,
        RelaxedG4 | BipartiteG4 | RelaxedIMotif => 0.8,
        ImperfectG4 | AcMotif => 0.7,
        GTriplex => 0.6,
        _ => 1.0,
    }
}

/// `g4hunter_runs` over G-runs (quadruplexes) or C-runs (i-motifs).
#[derive(Debug, Clone)]
pub struct G4HunterScore {
    base: u8,
}

impl G4HunterScore {
    pub fn guanine() -> Self {
        G4HunterScore { base: b'G' }
    }

    pub fn cytosine() -> Self {
        G4HunterScore { base: b'C' }
    }
}

impl ScoringStrategy for G4HunterScore {
    fn method(&self) -> &'static str {
        "g4hunter_runs"
    }

    fn raw_score(&self, candidate: &Candidate, slice: &[u8]) -> f64 {
        g4hunter_runs(slice, self.base) * stability(candidate.subclass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motif::MotifDetails;
    use crate::score::ScoringRegistry;

    #[test]
    fn run_score() {
        let score = g4hunter_runs(b"GGGTTAGGGTTAGGGTTAGGG", b'G');
        assert!((score - 36.0 / 21.0).abs() < 1e-12);
        assert_eq!(g4hunter_runs(b"GGGTTAGGGCCC", b'G'), 0.0);
        assert_eq!(g4hunter_runs(b"TTTT", b'G'), 0.0);
        assert!((g4hunter_runs(b"CCCTCCC", b'C') - 18.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn canonical_outscores_overlapping_triplex() {
        let seq = b"GGGTTAGGGTTAGGGTTAGGG";
        let registry = ScoringRegistry::standard();
        let canonical = registry
            .score(
                Candidate::from_span(Subclass::CanonicalG4, 0, 21, MotifDetails::None),
                seq,
            )
            .unwrap();
        let triplex = registry
            .score(
                Candidate::from_span(Subclass::GTriplex, 0, 15, MotifDetails::None),
                seq,
            )
            .unwrap();
        assert!(canonical.normalized_score > 0.0);
        assert!(canonical.normalized_score > triplex.normalized_score);
    }
}
