use super::{DetectorContext, DetectorError, PatternSet};
use crate::motif::{Candidate, MotifDetails, Subclass};
use once_cell::sync::Lazy;
use regex::bytes::Regex;

const EGZ_UNIT: &[u8] = b"CGG";
const EGZ_MIN_COPIES: usize = 4;

static STICKY: Lazy<Result<Regex, String>> =
    Lazy::new(|| Regex::new("(?:GAA){4,}|(?:TTC){4,}").map_err(|e| e.to_string()));

/// Extruded-G Z-DNA: at least four tandem CGG copies.
///
/// Hits of the four-copy literal that sit exactly one unit apart belong to the
/// same tract.
pub fn find_egz(
    seq: &[u8],
    ctx: &DetectorContext,
    detector: &str,
) -> Result<Vec<Candidate>, DetectorError> {
    let literal = EGZ_UNIT.repeat(EGZ_MIN_COPIES);
    let hits = ctx.literal_hits(detector, &PatternSet::new(&[&literal]), seq)?;

    let unit = EGZ_UNIT.len();
    let mut tracts: Vec<(usize, usize)> = Vec::new();
    for hit in hits {
        match tracts.last_mut() {
            Some((_, last_hit)) if hit.start == *last_hit + unit => *last_hit = hit.start,
            _ => tracts.push((hit.start, hit.start)),
        }
    }

    Ok(tracts
        .into_iter()
        .map(|(first, last)| {
            let end = last + literal.len();
            Candidate::from_span(
                Subclass::Egz,
                first,
                end,
                MotifDetails::Tandem {
                    unit: String::from_utf8_lossy(EGZ_UNIT).into_owned(),
                    copies: (end - first) / unit,
                    partial: 0,
                },
            )
        })
        .collect())
}

/// Sticky DNA: at least four tandem GAA (or TTC) copies.
pub fn find_sticky_dna(
    seq: &[u8],
    ctx: &DetectorContext,
    detector: &str,
) -> Result<Vec<Candidate>, DetectorError> {
    let re = STICKY.as_ref().map_err(|reason| DetectorError::Failed {
        detector: detector.to_string(),
        reason: reason.clone(),
    })?;
    ctx.check(detector)?;
    Ok(re
        .find_iter(seq)
        .map(|m| {
            let unit = &seq[m.start()..m.start() + 3];
            Candidate::from_span(
                Subclass::StickyDna,
                m.start(),
                m.end(),
                MotifDetails::Tandem {
                    unit: String::from_utf8_lossy(unit).into_owned(),
                    copies: m.len() / 3,
                    partial: 0,
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cgg_tract_is_chained() {
        let ctx = DetectorContext::unbounded();
        let found = find_egz(b"ATCGGCGGCGGCGGCGGAT", &ctx, "egz").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].start, found[0].end), (3, 17));
        assert_eq!(
            found[0].details,
            MotifDetails::Tandem {
                unit: "CGG".to_string(),
                copies: 5,
                partial: 0
            }
        );
        assert!(find_egz(b"CGGCGGCGGATT", &ctx, "egz").unwrap().is_empty());
    }

    #[test]
    fn gaa_and_ttc_tracts() {
        let ctx = DetectorContext::unbounded();
        let found = find_sticky_dna(b"CGAAGAAGAAGAACTTCTTCTTCTTCTTCG", &ctx, "sticky").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!((found[0].start, found[0].end), (2, 13));
        assert_eq!((found[1].start, found[1].end), (15, 29));
        assert!(matches!(
            &found[1].details,
            MotifDetails::Tandem { unit, copies: 5, .. } if unit == "TTC"
        ));
    }
}
