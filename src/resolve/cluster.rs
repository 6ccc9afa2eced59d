use crate::motif::{ScoredMotif, Subclass};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const DEFAULT_MERGE_DISTANCE: usize = 10;

/// Higher normalized score first, then longer, then leftmost.
fn better(a: &ScoredMotif, b: &ScoredMotif) -> bool {
    match a.normalized_score.total_cmp(&b.normalized_score) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => (a.len(), std::cmp::Reverse(a.start())) > (b.len(), std::cmp::Reverse(b.start())),
    }
}

/// Collapses near-duplicate detections of each (class, subclass) group.
///
/// Within a group motifs are swept by start; a motif starting at most
/// `max_distance` bases past the rightmost end of the current run joins it,
/// and only the best member of every run survives. Output is sorted by start.
pub fn merge_clusters(motifs: Vec<ScoredMotif>, max_distance: usize) -> Vec<ScoredMotif> {
    let mut groups: BTreeMap<Subclass, Vec<ScoredMotif>> = BTreeMap::new();
    for motif in motifs {
        groups.entry(motif.subclass()).or_default().push(motif);
    }

    let mut merged = Vec::new();
    for (_, mut group) in groups {
        group.sort_by(|a, b| {
            (a.start(), a.end())
                .cmp(&(b.start(), b.end()))
                .then(b.normalized_score.total_cmp(&a.normalized_score))
        });
        let mut iter = group.into_iter();
        let Some(first) = iter.next() else {
            continue;
        };
        let mut run_end = first.end();
        let mut best = first;
        for motif in iter {
            if motif.start() <= run_end + max_distance {
                run_end = run_end.max(motif.end());
                if better(&motif, &best) {
                    best = motif;
                }
            } else {
                merged.push(best);
                run_end = motif.end();
                best = motif;
            }
        }
        merged.push(best);
    }
    merged.sort_by_key(|m| (m.start(), m.end(), m.subclass()));
    merged
}
