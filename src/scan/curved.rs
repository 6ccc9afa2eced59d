use super::runs::{find_runs, Run};
use super::{DetectorContext, DetectorError};
use crate::motif::{Candidate, MotifDetails, Subclass};

const MIN_TRACT: usize = 3;
const MAX_TRACT: usize = 9;
const MIN_ARRAY_TRACTS: usize = 3;
const MIN_PHASING: f64 = 8.0;
const MAX_PHASING: f64 = 12.0;
const MIN_LOCAL_TRACT: usize = 7;

/// Intrinsically curved DNA.
///
/// A-tracts and T-tracts whose centers recur roughly once per helical turn
/// form a phased array (global curvature). Long tracts not consumed by an
/// array are reported on their own (local curvature).
pub fn find_curved_dna(
    seq: &[u8],
    ctx: &DetectorContext,
    detector: &str,
) -> Result<Vec<Candidate>, DetectorError> {
    let runs = find_runs(seq, ctx, detector, &[(b'A', MIN_TRACT), (b'T', MIN_TRACT)])?;
    let mut tracts: Vec<Run> = runs.into_iter().flatten().collect();
    tracts.sort();
    ctx.check(detector)?;

    let mut consumed = vec![false; tracts.len()];
    let mut found = Vec::new();
    let mut i = 0;
    while i < tracts.len() {
        if tracts[i].len() > MAX_TRACT {
            i += 1;
            continue;
        }
        let mut last = i;
        while last + 1 < tracts.len() && tracts[last + 1].len() <= MAX_TRACT {
            let spacing = tracts[last + 1].center() - tracts[last].center();
            if !(MIN_PHASING..=MAX_PHASING).contains(&spacing) {
                break;
            }
            last += 1;
        }
        let count = last - i + 1;
        if count >= MIN_ARRAY_TRACTS {
            found.push(Candidate::from_span(
                Subclass::GlobalCurvature,
                tracts[i].start,
                tracts[last].end,
                MotifDetails::Runs { count },
            ));
            consumed[i..=last].iter_mut().for_each(|c| *c = true);
            i = last + 1;
        } else {
            i += 1;
        }
    }

    for (tract, _) in tracts
        .iter()
        .zip(&consumed)
        .filter(|(t, used)| !**used && t.len() >= MIN_LOCAL_TRACT)
    {
        found.push(Candidate::from_span(
            Subclass::LocalCurvature,
            tract.start,
            tract.end,
            MotifDetails::Runs { count: 1 },
        ));
    }
    found.sort_by_key(|c| (c.start, c.end));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curved(seq: &[u8]) -> Vec<Candidate> {
        find_curved_dna(seq, &DetectorContext::unbounded(), "curved_dna").unwrap()
    }

    #[test]
    fn phased_tracts_form_an_array() {
        // Tract centers 10 bases apart
        let seq = b"GCAAAAAGCGCCAAAAAGCGCCAAAAAGCGCC";
        let found = curved(seq);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].subclass, Subclass::GlobalCurvature);
        assert_eq!((found[0].start, found[0].end), (3, 27));
        assert_eq!(found[0].details, MotifDetails::Runs { count: 3 });
    }

    #[test]
    fn consumed_tracts_are_not_reported_alone() {
        let seq = b"GCAAAAAAAGCCAAAAAAAGCCAAAAAAAGCC";
        let found = curved(seq);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].subclass, Subclass::GlobalCurvature);
    }

    #[test]
    fn isolated_long_tract_is_local() {
        let found = curved(b"GCGCTTTTTTTTGCGCGC");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].subclass, Subclass::LocalCurvature);
        assert_eq!((found[0].start, found[0].end), (5, 12));
        assert!(curved(b"GCGCTTTTTTGCGC").is_empty());
    }

    #[test]
    fn unphased_tracts_are_ignored() {
        assert!(curved(b"AAAAGCAAAAGCAAAAGC").is_empty());
    }
}
