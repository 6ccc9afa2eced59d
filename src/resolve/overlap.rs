use super::intervals::IntervalSet;
use crate::motif::{MotifClass, ResolvedMotif, ScoredMotif};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// Default order in which classes claim sequence during resolution.
pub const DEFAULT_CLASS_PRIORITY: [MotifClass; 8] = [
    MotifClass::GQuadruplex,
    MotifClass::ZDna,
    MotifClass::IMotif,
    MotifClass::Triplex,
    MotifClass::CurvedDna,
    MotifClass::Cruciform,
    MotifClass::RLoop,
    MotifClass::SlippedDna,
];

pub const DEFAULT_OVERLAP_BUDGET: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlapPolicy {
    pub class_priority: Vec<MotifClass>,
    /// Largest fraction of a motif that may be shared with motifs of other classes.
    pub overlap_budget: f64,
}

impl Default for OverlapPolicy {
    fn default() -> Self {
        OverlapPolicy {
            class_priority: DEFAULT_CLASS_PRIORITY.to_vec(),
            overlap_budget: DEFAULT_OVERLAP_BUDGET,
        }
    }
}

impl OverlapPolicy {
    fn class_rank(&self, class: MotifClass) -> usize {
        self.class_priority
            .iter()
            .position(|&c| c == class)
            .unwrap_or(self.class_priority.len())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolutionStats {
    pub invalid: usize,
    pub same_class: usize,
    pub cross_class: usize,
}

fn is_valid(motif: &ScoredMotif, seq_len: usize) -> bool {
    motif.start() >= 1 && motif.start() <= motif.end() && motif.end() <= seq_len
}

/// Accepted motifs of every class, indexed by start.
#[derive(Default)]
struct AcceptedSpans {
    by_start: BTreeMap<usize, Vec<(usize, MotifClass)>>,
    max_len: usize,
}

impl AcceptedSpans {
    fn insert(&mut self, start: usize, end: usize, class: MotifClass) {
        self.by_start.entry(start).or_default().push((end, class));
        self.max_len = self.max_len.max(end - start + 1);
    }

    /// Whether some accepted motif of another class would share more than
    /// `budget` of its own length with `[start, end]`.
    fn would_swallow(&self, start: usize, end: usize, class: MotifClass, budget: f64) -> bool {
        let from = start.saturating_sub(self.max_len);
        self.by_start
            .range(from..=end)
            .flat_map(|(&s, spans)| spans.iter().map(move |&(e, c)| (s, e, c)))
            .filter(|&(_, e, c)| c != class && e >= start)
            .any(|(s, e, _)| {
                let shared = e.min(end) - s.max(start) + 1;
                shared as f64 > budget * (e - s + 1) as f64
            })
    }
}

/// Greedy selection of a near-independent motif set.
///
/// Motifs are visited by class priority, then best normalized score, subclass
/// tie-break rank and length. A motif is rejected when it touches a position
/// already claimed by its own class, or when more than the overlap budget of
/// either it or an accepted motif of another class would be shared. Accepted
/// motifs are numbered in coordinate order.
pub fn resolve_overlaps(
    motifs: Vec<ScoredMotif>,
    seq_len: usize,
    policy: &OverlapPolicy,
) -> (Vec<ResolvedMotif>, ResolutionStats) {
    let mut stats = ResolutionStats::default();
    let mut ordered: Vec<ScoredMotif> = motifs
        .into_iter()
        .filter(|m| {
            let valid = is_valid(m, seq_len);
            if !valid {
                stats.invalid += 1;
            }
            valid
        })
        .collect();
    ordered.sort_by(|a, b| {
        policy
            .class_rank(a.class())
            .cmp(&policy.class_rank(b.class()))
            .then(b.normalized_score.total_cmp(&a.normalized_score))
            .then(a.subclass().priority_rank().cmp(&b.subclass().priority_rank()))
            .then(Reverse(a.len()).cmp(&Reverse(b.len())))
            .then((a.start(), a.end(), a.subclass()).cmp(&(b.start(), b.end(), b.subclass())))
    });

    let mut per_class: HashMap<MotifClass, IntervalSet> = HashMap::new();
    let mut claimed = IntervalSet::new();
    let mut spans = AcceptedSpans::default();
    let mut accepted = Vec::new();

    for motif in ordered {
        let (start, end, class) = (motif.start(), motif.end(), motif.class());
        let own = per_class.entry(class).or_default();
        if own.overlaps(start, end) {
            stats.same_class += 1;
            continue;
        }
        let own_claimed = own.covered(start, end);
        let other_claimed = claimed.covered(start, end) - own_claimed;
        if other_claimed as f64 > policy.overlap_budget * motif.len() as f64
            || spans.would_swallow(start, end, class, policy.overlap_budget)
        {
            stats.cross_class += 1;
            continue;
        }
        own.insert(start, end);
        claimed.insert(start, end);
        spans.insert(start, end, class);
        accepted.push(motif);
    }

    (number_motifs(accepted), stats)
}

/// Sorts motifs by coordinate and assigns ordinals from 1.
pub fn number_motifs(mut motifs: Vec<ScoredMotif>) -> Vec<ResolvedMotif> {
    motifs.sort_by(|a, b| {
        (a.start(), a.end(), a.class(), a.subclass())
            .cmp(&(b.start(), b.end(), b.class(), b.subclass()))
            .then(b.normalized_score.total_cmp(&a.normalized_score))
    });
    motifs
        .into_iter()
        .enumerate()
        .map(|(i, motif)| ResolvedMotif::new(i + 1, motif))
        .collect()
}

/// Keeps only motifs with valid coordinates; used when resolution is disabled.
pub fn drop_invalid(motifs: Vec<ScoredMotif>, seq_len: usize) -> (Vec<ScoredMotif>, usize) {
    let before = motifs.len();
    let kept: Vec<ScoredMotif> = motifs.into_iter().filter(|m| is_valid(m, seq_len)).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motif::{Candidate, MotifDetails, Subclass};

    fn motif(subclass: Subclass, start: usize, end: usize, score: f64) -> ScoredMotif {
        ScoredMotif {
            candidate: Candidate {
                subclass,
                start,
                end,
                details: MotifDetails::None,
            },
            raw_score: score,
            normalized_score: score,
            method: "test",
        }
    }

    fn spans(resolved: &[ResolvedMotif]) -> Vec<(Subclass, usize, usize)> {
        resolved
            .iter()
            .map(|r| (r.motif.subclass(), r.motif.start(), r.motif.end()))
            .collect()
    }

    #[test]
    fn same_class_overlap_keeps_best() {
        let (resolved, stats) = resolve_overlaps(
            vec![
                motif(Subclass::GTriplex, 1, 15, 0.45),
                motif(Subclass::CanonicalG4, 1, 21, 0.51),
            ],
            100,
            &OverlapPolicy::default(),
        );
        assert_eq!(spans(&resolved), vec![(Subclass::CanonicalG4, 1, 21)]);
        assert_eq!(stats.same_class, 1);
        assert_eq!(resolved[0].ordinal, 1);
    }

    #[test]
    fn equal_scores_use_subclass_rank() {
        let (resolved, _) = resolve_overlaps(
            vec![
                motif(Subclass::ImperfectG4, 1, 20, 0.5),
                motif(Subclass::BulgedG4, 1, 20, 0.5),
            ],
            100,
            &OverlapPolicy::default(),
        );
        assert_eq!(spans(&resolved), vec![(Subclass::BulgedG4, 1, 20)]);
    }

    #[test]
    fn other_class_budget() {
        let (resolved, stats) = resolve_overlaps(
            vec![
                motif(Subclass::ZDna, 1, 32, 0.9),
                // 32 of 40 bases claimed by Z-DNA
                motif(Subclass::Str, 1, 40, 0.9),
                // 5 of 30 bases claimed
                motif(Subclass::InvertedRepeat, 28, 57, 0.3),
            ],
            100,
            &OverlapPolicy::default(),
        );
        assert_eq!(
            spans(&resolved),
            vec![(Subclass::ZDna, 1, 32), (Subclass::InvertedRepeat, 28, 57)]
        );
        assert_eq!(stats.cross_class, 1);
    }

    #[test]
    fn large_motif_cannot_swallow_accepted_one() {
        // The G4 would lose all of its bases to the later, larger curved region
        let (resolved, _) = resolve_overlaps(
            vec![
                motif(Subclass::CanonicalG4, 50, 60, 0.9),
                motif(Subclass::GlobalCurvature, 1, 100, 0.9),
            ],
            100,
            &OverlapPolicy::default(),
        );
        assert_eq!(spans(&resolved), vec![(Subclass::CanonicalG4, 50, 60)]);
    }

    #[test]
    fn invalid_coordinates_are_dropped() {
        let (resolved, stats) = resolve_overlaps(
            vec![
                motif(Subclass::Str, 0, 10, 0.9),
                motif(Subclass::Str, 20, 10, 0.9),
                motif(Subclass::Str, 90, 120, 0.9),
                motif(Subclass::Str, 30, 40, 0.1),
            ],
            100,
            &OverlapPolicy::default(),
        );
        assert_eq!(spans(&resolved), vec![(Subclass::Str, 30, 40)]);
        assert_eq!(stats.invalid, 3);
    }

    #[test]
    fn class_priority_is_configurable() {
        let policy = OverlapPolicy {
            class_priority: vec![MotifClass::SlippedDna, MotifClass::ZDna],
            ..OverlapPolicy::default()
        };
        let (resolved, _) = resolve_overlaps(
            vec![
                motif(Subclass::ZDna, 1, 32, 0.9),
                motif(Subclass::Str, 1, 32, 0.2),
            ],
            100,
            &policy,
        );
        assert_eq!(spans(&resolved), vec![(Subclass::Str, 1, 32)]);
    }
}
