//! Per-class scoring strategies and the table that dispatches them.
//!
//! Every strategy is a pure function of the candidate and its bases. The raw
//! score is mapped into [0, 1] by the band registered with the strategy.

mod g4hunter;
mod repeat;
mod structure;
pub mod zseeker;

pub use g4hunter::{g4hunter_runs, G4HunterScore};
pub use repeat::RepeatCountScore;
pub use structure::{ArmStructureScore, CurvatureScore, RLoopScore};
pub use zseeker::ZSeekerScore;

use crate::motif::{Candidate, ScoredMotif, Subclass};
use crate::utils::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps a raw score into [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBand {
    /// `(raw - min) / (max' - min)` where `max'` is `max` scaled by the
    /// candidate length over `expected_len`, clamped to `[0.5, 2]`.
    Linear {
        min: f64,
        max: f64,
        expected_len: f64,
    },
    /// `raw / (raw + half)`.
    Saturating { half: f64 },
}

impl ScoreBand {
    pub fn normalize(&self, raw: f64, len: usize) -> f64 {
        let value = match *self {
            ScoreBand::Linear {
                min,
                max,
                expected_len,
            } => {
                let scale = (len as f64 / expected_len).clamp(0.5, 2.0);
                let span = max * scale - min;
                if span <= 0.0 {
                    0.0
                } else {
                    (raw - min) / span
                }
            }
            ScoreBand::Saturating { half } => {
                if raw <= 0.0 {
                    0.0
                } else {
                    raw / (raw + half)
                }
            }
        };
        if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

pub trait ScoringStrategy: Send + Sync {
    /// Stable identifier written to the `scoring_method` column.
    fn method(&self) -> &'static str;

    fn raw_score(&self, candidate: &Candidate, slice: &[u8]) -> f64;
}

#[derive(Clone)]
struct Registration {
    strategy: Arc<dyn ScoringStrategy>,
    band: ScoreBand,
}

/// Subclass to strategy table, filled once at startup.
#[derive(Clone, Default)]
pub struct ScoringRegistry {
    entries: HashMap<Subclass, Registration>,
}

impl ScoringRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, subclass: Subclass, strategy: Arc<dyn ScoringStrategy>, band: ScoreBand) {
        self.entries
            .insert(subclass, Registration { strategy, band });
    }

    pub fn contains(&self, subclass: Subclass) -> bool {
        self.entries.contains_key(&subclass)
    }

    /// Registry covering every detector subclass.
    pub fn standard() -> Self {
        use Subclass::*;
        let mut registry = ScoringRegistry::new();

        let g4 = Arc::new(G4HunterScore::guanine());
        let g4_band = ScoreBand::Linear {
            min: 0.0,
            max: 4.0,
            expected_len: 25.0,
        };
        for subclass in [
            MultimericG4,
            CanonicalG4,
            RelaxedG4,
            BulgedG4,
            BipartiteG4,
            ImperfectG4,
            GTriplex,
        ] {
            registry.register(subclass, g4.clone(), g4_band);
        }
        let i_motif = Arc::new(G4HunterScore::cytosine());
        for subclass in [CanonicalIMotif, RelaxedIMotif, AcMotif] {
            registry.register(subclass, i_motif.clone(), g4_band);
        }

        registry.register(
            ZDna,
            Arc::new(ZSeekerScore::default()),
            ScoreBand::Linear {
                min: 0.0,
                max: 210.0,
                expected_len: 30.0,
            },
        );

        let repeats = Arc::new(RepeatCountScore);
        registry.register(
            Str,
            repeats.clone(),
            ScoreBand::Linear {
                min: 10.0,
                max: 60.0,
                expected_len: 30.0,
            },
        );
        registry.register(
            Egz,
            repeats.clone(),
            ScoreBand::Linear {
                min: 0.0,
                max: 60.0,
                expected_len: 30.0,
            },
        );
        registry.register(
            StickyDna,
            repeats.clone(),
            ScoreBand::Linear {
                min: 0.0,
                max: 60.0,
                expected_len: 30.0,
            },
        );
        registry.register(
            DirectRepeat,
            repeats,
            ScoreBand::Linear {
                min: 0.0,
                max: 200.0,
                expected_len: 60.0,
            },
        );

        let arms = Arc::new(ArmStructureScore);
        registry.register(InvertedRepeat, arms.clone(), ScoreBand::Saturating { half: 20.0 });
        registry.register(MirrorRepeat, arms, ScoreBand::Saturating { half: 15.0 });

        let curvature = Arc::new(CurvatureScore);
        registry.register(
            GlobalCurvature,
            curvature.clone(),
            ScoreBand::Linear {
                min: 0.0,
                max: 40.0,
                expected_len: 30.0,
            },
        );
        registry.register(
            LocalCurvature,
            curvature,
            ScoreBand::Linear {
                min: 0.0,
                max: 15.0,
                expected_len: 9.0,
            },
        );

        registry.register(
            RLoopSite,
            Arc::new(RLoopScore),
            ScoreBand::Linear {
                min: 0.0,
                max: 4.0,
                expected_len: 300.0,
            },
        );
        registry
    }

    /// Scores one candidate against `seq`, the sequence its coordinates refer to.
    ///
    /// A subclass without a registered strategy is a configuration error and
    /// the only scoring failure reported to the caller.
    pub fn score(&self, candidate: Candidate, seq: &[u8]) -> Result<ScoredMotif> {
        let registration = self.entries.get(&candidate.subclass).ok_or_else(|| {
            format!(
                "No scoring strategy registered for {}",
                candidate.subclass.name()
            )
        })?;
        let slice = candidate.slice(seq);
        let raw = registration.strategy.raw_score(&candidate, slice);
        let raw_score = if raw.is_finite() { raw } else { 0.0 };
        let normalized_score = registration.band.normalize(raw_score, candidate.len());
        Ok(ScoredMotif {
            candidate,
            raw_score,
            normalized_score,
            method: registration.strategy.method(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motif::MotifDetails;

    #[test]
    fn linear_band_scales_with_length() {
        let band = ScoreBand::Linear {
            min: 0.0,
            max: 10.0,
            expected_len: 20.0,
        };
        assert_eq!(band.normalize(5.0, 20), 0.5);
        // Short candidates use half the band, long ones at most twice it
        assert_eq!(band.normalize(5.0, 5), 1.0);
        assert_eq!(band.normalize(5.0, 100), 0.25);
        assert_eq!(band.normalize(-3.0, 20), 0.0);
    }

    #[test]
    fn saturating_band() {
        let band = ScoreBand::Saturating { half: 20.0 };
        assert_eq!(band.normalize(20.0, 30), 0.5);
        assert_eq!(band.normalize(0.0, 30), 0.0);
        assert!(band.normalize(1e9, 30) <= 1.0);
    }

    #[test]
    fn every_detector_subclass_is_registered() {
        let registry = ScoringRegistry::standard();
        for subclass in Subclass::ALL {
            assert_eq!(
                registry.contains(subclass),
                !subclass.class().is_composite(),
                "{}",
                subclass
            );
        }
    }

    #[test]
    fn missing_strategy_is_an_error() {
        let registry = ScoringRegistry::new();
        let candidate = Candidate::from_span(Subclass::Str, 0, 4, MotifDetails::None);
        assert!(registry.score(candidate, b"ACGT").is_err());
    }

    #[test]
    fn alternating_cg_normalizes_near_one() {
        let registry = ScoringRegistry::standard();
        let seq = b"CG".repeat(16);
        let candidate = Candidate::from_span(Subclass::ZDna, 0, 32, MotifDetails::None);
        let scored = registry.score(candidate, &seq).unwrap();
        assert_eq!(scored.raw_score, 217.0);
        assert!(scored.normalized_score > 0.95 && scored.normalized_score <= 1.0);
        assert_eq!(scored.method, "z_seeker");
    }
}
