use crate::motif::{ClassSet, CompositeKind, CompositeMotif, ResolvedMotif};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct HotspotParams {
    pub window: usize,
    pub min_motifs: usize,
    pub min_classes: usize,
}

impl Default for HotspotParams {
    fn default() -> Self {
        HotspotParams {
            window: 100,
            min_motifs: 3,
            min_classes: 3,
        }
    }
}

/// Window anchored at a motif start that holds enough motifs and classes.
struct Qualifying {
    window_start: usize,
    window_end: usize,
    members: Vec<usize>,
}

/// Motif-dense regions.
///
/// A window of `params.window` bases is anchored at every motif start; it
/// qualifies when the motifs lying entirely inside it number at least
/// `min_motifs` and span at least `min_classes` classes. Overlapping or
/// adjacent qualifying windows merge into one region covering the union of
/// their members. The raw score is motifs per 100 bases times the class
/// count, normalized as `raw / (raw + 10)`.
pub fn find_hotspots(motifs: &[ResolvedMotif], params: &HotspotParams) -> Vec<CompositeMotif> {
    if params.window == 0 {
        return Vec::new();
    }
    let mut ordered: Vec<&ResolvedMotif> = motifs.iter().collect();
    ordered.sort_by_key(|m| (m.motif.start(), m.motif.end(), m.ordinal));

    let mut windows: Vec<Qualifying> = Vec::new();
    for (i, anchor) in ordered.iter().enumerate() {
        let window_start = anchor.motif.start();
        let window_end = window_start + params.window - 1;
        let inside: Vec<&ResolvedMotif> = ordered[i..]
            .iter()
            .take_while(|m| m.motif.start() <= window_end)
            .filter(|m| m.motif.end() <= window_end)
            .copied()
            .collect();
        if inside.len() < params.min_motifs
            || distinct_classes(&inside).len() < params.min_classes
        {
            continue;
        }
        windows.push(Qualifying {
            window_start,
            window_end,
            members: inside.iter().map(|m| m.ordinal).collect(),
        });
    }

    let mut regions: Vec<Qualifying> = Vec::new();
    for window in windows {
        match regions.last_mut() {
            Some(region) if window.window_start <= region.window_end + 1 => {
                region.window_end = region.window_end.max(window.window_end);
                region.members.extend(window.members);
            }
            _ => regions.push(window),
        }
    }

    regions
        .into_iter()
        .filter_map(|region| {
            let ordinals: BTreeSet<usize> = region.members.into_iter().collect();
            let members: Vec<&ResolvedMotif> = ordered
                .iter()
                .filter(|m| ordinals.contains(&m.ordinal))
                .copied()
                .collect();
            let start = members.iter().map(|m| m.motif.start()).min()?;
            let end = members.iter().map(|m| m.motif.end()).max()?;
            let classes = distinct_classes(&members);
            let density = members.len() as f64 * 100.0 / (end - start + 1) as f64;
            let raw_score = density * classes.len() as f64;
            Some(CompositeMotif {
                kind: CompositeKind::Cluster,
                start,
                end,
                members: ordinals.into_iter().collect(),
                classes,
                raw_score,
                normalized_score: raw_score / (raw_score + 10.0),
            })
        })
        .collect()
}

fn distinct_classes(motifs: &[&ResolvedMotif]) -> ClassSet {
    let mut classes = ClassSet::new();
    for motif in motifs {
        let class = motif.motif.class();
        if !class.is_composite() && !classes.contains(&class) && !classes.is_full() {
            classes.push(class);
        }
    }
    classes.sort();
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motif::{Candidate, MotifDetails, ScoredMotif, Subclass};

    fn resolved(ordinal: usize, subclass: Subclass, start: usize, end: usize) -> ResolvedMotif {
        ResolvedMotif::new(
            ordinal,
            ScoredMotif {
                candidate: Candidate {
                    subclass,
                    start,
                    end,
                    details: MotifDetails::None,
                },
                raw_score: 1.0,
                normalized_score: 0.5,
                method: "test",
            },
        )
    }

    #[test]
    fn dense_mixed_window_is_a_hotspot() {
        let motifs = vec![
            resolved(1, Subclass::CanonicalG4, 1, 21),
            resolved(2, Subclass::ZDna, 30, 61),
            resolved(3, Subclass::Str, 70, 83),
            resolved(4, Subclass::InvertedRepeat, 400, 434),
        ];
        let hotspots = find_hotspots(&motifs, &HotspotParams::default());
        assert_eq!(hotspots.len(), 1);
        assert_eq!((hotspots[0].start, hotspots[0].end), (1, 83));
        assert_eq!(hotspots[0].members, vec![1, 2, 3]);
        assert_eq!(hotspots[0].classes.len(), 3);
    }

    #[test]
    fn overlapping_windows_merge() {
        let motifs = vec![
            resolved(1, Subclass::CanonicalG4, 1, 21),
            resolved(2, Subclass::ZDna, 30, 61),
            resolved(3, Subclass::Str, 70, 83),
            resolved(4, Subclass::InvertedRepeat, 90, 124),
        ];
        let hotspots = find_hotspots(&motifs, &HotspotParams::default());
        assert_eq!(hotspots.len(), 1);
        assert_eq!((hotspots[0].start, hotspots[0].end), (1, 124));
        assert_eq!(hotspots[0].members, vec![1, 2, 3, 4]);
    }

    #[test]
    fn spread_out_motifs_are_not_a_hotspot() {
        let motifs = vec![
            resolved(1, Subclass::CanonicalG4, 1, 21),
            resolved(2, Subclass::ZDna, 150, 181),
            resolved(3, Subclass::Str, 300, 313),
            resolved(4, Subclass::InvertedRepeat, 450, 484),
        ];
        assert!(find_hotspots(&motifs, &HotspotParams::default()).is_empty());
    }

    #[test]
    fn single_class_crowd_is_not_a_hotspot() {
        let motifs = vec![
            resolved(1, Subclass::Str, 1, 12),
            resolved(2, Subclass::Str, 20, 32),
            resolved(3, Subclass::DirectRepeat, 40, 60),
        ];
        assert!(find_hotspots(&motifs, &HotspotParams::default()).is_empty());
    }
}
