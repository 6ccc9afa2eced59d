use super::RepeatParams;
use crate::motif::{Candidate, MotifDetails, Subclass};
use crate::scan::{DetectorContext, DetectorError};

/// True when `unit` is not itself a repetition of a shorter unit.
fn is_primitive(unit: &[u8]) -> bool {
    let len = unit.len();
    (1..len)
        .filter(|period| len % period == 0)
        .all(|period| (period..len).any(|i| unit[i] != unit[i - period]))
}

/// Copies of `seq[start..start + unit_len]` laid end to end from `start`,
/// plus the length of a trailing partial copy.
fn count_copies(seq: &[u8], start: usize, unit_len: usize) -> (usize, usize) {
    let unit = &seq[start..start + unit_len];
    let mut copies = 1;
    let mut pos = start + unit_len;
    while pos + unit_len <= seq.len() && &seq[pos..pos + unit_len] == unit {
        copies += 1;
        pos += unit_len;
    }
    let partial = seq[pos..]
        .iter()
        .zip(unit)
        .take_while(|(a, b)| a == b)
        .count();
    (copies, partial.min(unit_len - 1))
}

/// Short tandem repeats: units of `1..=max_unit` bases repeated at least
/// `min_copies` times with a total length of at least `min_len`.
///
/// At each position the unit giving the longest tract wins (shorter unit on
/// ties) and the scan resumes after the reported tract.
pub fn find_strs(
    seq: &[u8],
    params: &RepeatParams,
    ctx: &DetectorContext,
) -> Result<Vec<Candidate>, DetectorError> {
    let mut found = Vec::new();
    let mut pos = 0;
    while pos < seq.len() {
        if pos % 1024 == 0 {
            ctx.check("str")?;
        }
        if seq[pos] == b'N' {
            pos += 1;
            continue;
        }

        let mut best: Option<(usize, usize, usize)> = None;
        for unit_len in 1..=params.str_max_unit {
            if pos + unit_len > seq.len() {
                break;
            }
            let unit = &seq[pos..pos + unit_len];
            if unit.contains(&b'N') || !is_primitive(unit) {
                continue;
            }
            let (copies, partial) = count_copies(seq, pos, unit_len);
            let total = copies * unit_len + partial;
            if best.map_or(true, |(_, _, best_total)| total > best_total) {
                best = Some((unit_len, copies, total));
            }
        }

        match best {
            Some((unit_len, copies, total))
                if copies >= params.str_min_copies && total >= params.str_min_len =>
            {
                let unit = String::from_utf8_lossy(&seq[pos..pos + unit_len]).into_owned();
                found.push(Candidate::from_span(
                    Subclass::Str,
                    pos,
                    pos + total,
                    MotifDetails::Tandem {
                        unit,
                        copies,
                        partial: total - copies * unit_len,
                    },
                ));
                pos += total;
            }
            _ => pos += 1,
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(seq: &[u8]) -> Vec<Candidate> {
        find_strs(seq, &RepeatParams::default(), &DetectorContext::unbounded()).unwrap()
    }

    #[test]
    fn primitive_units() {
        assert!(is_primitive(b"CA"));
        assert!(is_primitive(b"GGGTTA"));
        assert!(!is_primitive(b"CACA"));
        assert!(!is_primitive(b"AAA"));
        assert!(!is_primitive(b"CAGCAG"));
    }

    #[test]
    fn dinucleotide_tract_is_reported_once() {
        let found = strs(b"CACACACACACACA");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 1);
        assert_eq!(found[0].end, 14);
        assert_eq!(
            found[0].details,
            MotifDetails::Tandem {
                unit: "CA".to_string(),
                copies: 7,
                partial: 0
            }
        );
    }

    #[test]
    fn trailing_partial_copy_extends_tract() {
        let found = strs(b"TTCAGCAGCAGCAGCATT");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 3);
        assert_eq!(found[0].end, 16);
        assert_eq!(
            found[0].details,
            MotifDetails::Tandem {
                unit: "CAG".to_string(),
                copies: 4,
                partial: 2
            }
        );
    }

    #[test]
    fn short_or_single_copy_tracts_are_ignored() {
        assert!(strs(b"ACGTACGTA").is_empty());
        assert!(strs(b"ACGTTGCAAGCT").is_empty());
        assert!(strs(b"NNNNNNNNNNNNNNNN").is_empty());
    }

    #[test]
    fn homopolymer_needs_ten_bases() {
        assert!(strs(b"GAAAAAAAAAG").len() == 0);
        let found = strs(b"GAAAAAAAAAAG");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].len(), 10);
    }
}
