use crate::motif::{ClassSet, CompositeKind, CompositeMotif, ResolvedMotif};

/// Hybrid regions: connected groups of intersecting motifs that involve at
/// least two classes.
///
/// The raw score is the class count times the mean stacking depth of the
/// region (member bases over union length); it is normalized as
/// `raw / (raw + 2)`.
pub fn find_hybrids(motifs: &[ResolvedMotif]) -> Vec<CompositeMotif> {
    let mut ordered: Vec<&ResolvedMotif> = motifs.iter().collect();
    ordered.sort_by_key(|m| (m.motif.start(), m.motif.end(), m.ordinal));

    let mut hybrids = Vec::new();
    let mut group: Vec<&ResolvedMotif> = Vec::new();
    let mut group_end = 0;
    for motif in ordered {
        if !group.is_empty() && motif.motif.start() > group_end {
            hybrids.extend(hybrid_of(&group));
            group.clear();
        }
        group_end = if group.is_empty() {
            motif.motif.end()
        } else {
            group_end.max(motif.motif.end())
        };
        group.push(motif);
    }
    hybrids.extend(hybrid_of(&group));
    hybrids
}

fn hybrid_of(group: &[&ResolvedMotif]) -> Option<CompositeMotif> {
    if group.len() < 2 {
        return None;
    }
    let mut classes = ClassSet::new();
    for motif in group {
        let class = motif.motif.class();
        if !classes.contains(&class) {
            classes.push(class);
        }
    }
    if classes.len() < 2 {
        return None;
    }
    classes.sort();

    let start = group.iter().map(|m| m.motif.start()).min()?;
    let end = group.iter().map(|m| m.motif.end()).max()?;
    let member_bases: usize = group.iter().map(|m| m.motif.len()).sum();
    let depth = member_bases as f64 / (end - start + 1) as f64;
    let raw_score = classes.len() as f64 * depth;

    let mut members: Vec<usize> = group.iter().map(|m| m.ordinal).collect();
    members.sort_unstable();
    Some(CompositeMotif {
        kind: CompositeKind::Hybrid,
        start,
        end,
        members,
        classes,
        raw_score,
        normalized_score: raw_score / (raw_score + 2.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motif::{Candidate, MotifClass, MotifDetails, ScoredMotif, Subclass};

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
    fn overlapping_classes_form_a_hybrid() {
        let motifs = vec![
            resolved(1, Subclass::CanonicalG4, 1, 20),
            resolved(2, Subclass::ZDna, 15, 40),
            resolved(3, Subclass::Str, 100, 120),
        ];
        let hybrids = find_hybrids(&motifs);
        assert_eq!(hybrids.len(), 1);
        let hybrid = &hybrids[0];
        assert_eq!((hybrid.start, hybrid.end), (1, 40));
        assert_eq!(hybrid.members, vec![1, 2]);
        assert_eq!(
            hybrid.classes.as_slice(),
            &[MotifClass::GQuadruplex, MotifClass::ZDna]
        );
        let expected = 2.0 * 46.0 / 40.0;
        assert!((hybrid.raw_score - expected).abs() < 1e-12);
    }

    #[test]
    fn single_class_groups_are_not_hybrids() {
        let motifs = vec![
            resolved(1, Subclass::CanonicalG4, 1, 20),
            resolved(2, Subclass::GTriplex, 10, 30),
            resolved(3, Subclass::ZDna, 31, 60),
        ];
        assert!(find_hybrids(&motifs).is_empty());
    }
}
