use super::hash::SequenceHasher;
use super::kmer::KmerIndex;
use super::RepeatParams;
use crate::motif::{Candidate, MotifDetails, Subclass};
use crate::scan::{DetectorContext, DetectorError};
use crate::utils::seq::AmbiguityMask;

/// Direct repeats: two copies of an `L`-base block (`L` in
/// `direct_min_unit..=direct_max_unit`) separated by at most `direct_max_spacer`
/// bases.
///
/// Seeds come from a k-mer index over first-copy starts; each partner k-mer
/// within reach fixes `L + spacer`, and the two blocks are confirmed with the
/// dual hash. The longest unit wins, then the shortest spacer.
pub fn find_direct_repeats(
    seq: &[u8],
    params: &RepeatParams,
    ctx: &DetectorContext,
) -> Result<Vec<Candidate>, DetectorError> {
    let n = seq.len();
    let min_unit = params.direct_min_unit;
    if n < 2 * min_unit {
        return Ok(Vec::new());
    }
    let k = params.seed_k.min(min_unit);
    let index = KmerIndex::new(seq, k);
    let hasher = SequenceHasher::new(seq);
    let mask = AmbiguityMask::new(seq);

    let mut found = Vec::new();
    let mut pos = 0;
    while pos + 2 * min_unit <= n {
        if pos % 256 == 0 {
            ctx.check("direct_repeat")?;
        }
        let reach = params.direct_max_unit + params.direct_max_spacer;
        let partners = index.partners_in(pos, pos + min_unit, pos + reach);

        let mut best: Option<(usize, usize)> = None;
        for &partner in partners {
            let distance = partner - pos;
            for spacer in 0..=params.direct_max_spacer.min(distance - min_unit) {
                let unit_len = distance - spacer;
                if unit_len > params.direct_max_unit {
                    continue;
                }
                let second = pos + unit_len + spacer;
                if second + unit_len > n
                    || !mask.is_clean(pos, pos + unit_len)
                    || !mask.is_clean(second, second + unit_len)
                {
                    continue;
                }
                if hasher.same(pos, &hasher, second, unit_len) {
                    let better = match best {
                        None => true,
                        Some((best_len, best_spacer)) => {
                            unit_len > best_len || (unit_len == best_len && spacer < best_spacer)
                        }
                    };
                    if better {
                        best = Some((unit_len, spacer));
                    }
                    break;
                }
            }
        }

        match best {
            Some((unit_len, spacer)) => {
                found.push(Candidate::from_span(
                    Subclass::DirectRepeat,
                    pos,
                    pos + 2 * unit_len + spacer,
                    MotifDetails::Spaced { unit_len, spacer },
                ));
                pos += unit_len;
            }
            None => pos += 1,
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct(seq: &[u8]) -> Vec<Candidate> {
        find_direct_repeats(seq, &RepeatParams::default(), &DetectorContext::unbounded()).unwrap()
    }

    #[test]
    fn adjacent_copies() {
        let block = b"ACGTTGCATGCA";
        let mut seq = b"TTT".to_vec();
        seq.extend_from_slice(block);
        seq.extend_from_slice(block);
        seq.extend_from_slice(b"GGG");
        let found = direct(&seq);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 4);
        assert_eq!(found[0].end, 27);
        assert_eq!(
            found[0].details,
            MotifDetails::Spaced {
                unit_len: 12,
                spacer: 0
            }
        );
    }

    #[test]
    fn spaced_copies() {
        let block = b"GATCCTAGGACT";
        let mut seq = block.to_vec();
        seq.extend_from_slice(b"TTTAT");
        seq.extend_from_slice(block);
        let found = direct(&seq);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].details,
            MotifDetails::Spaced {
                unit_len: 12,
                spacer: 5
            }
        );
        assert_eq!(found[0].len(), 29);
    }

    #[test]
    fn spacer_beyond_limit_is_ignored() {
        let block = b"GATCCTAGGACT";
        let mut seq = block.to_vec();
        seq.extend_from_slice(b"TTTATTTATTTA");
        seq.extend_from_slice(block);
        assert!(direct(&seq).is_empty());
    }

    #[test]
    fn blocks_with_n_are_skipped() {
        let block = b"NNNNNNNNNNNN";
        let mut seq = block.to_vec();
        seq.extend_from_slice(block);
        assert!(direct(&seq).is_empty());
    }
}
