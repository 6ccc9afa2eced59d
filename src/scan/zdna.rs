use super::{DetectorContext, DetectorError};
use crate::motif::{Candidate, MotifDetails, Subclass};
use crate::score::zseeker::{find_z_windows, ZSeekerParams};

/// Z-DNA: Z-seeker stretches of alternating purine-pyrimidine steps.
pub fn find_zdna(
    seq: &[u8],
    ctx: &DetectorContext,
    detector: &str,
) -> Result<Vec<Candidate>, DetectorError> {
    ctx.check(detector)?;
    let params = ZSeekerParams::default();
    Ok(find_z_windows(seq, &params)
        .into_iter()
        .map(|window| {
            let (start, end) = window.bases();
            Candidate::from_span(Subclass::ZDna, start, end, MotifDetails::None)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternating_cg_tract() {
        let mut seq = b"TTAT".to_vec();
        seq.extend(b"CG".repeat(16));
        seq.extend_from_slice(b"TTAT");
        let found = find_zdna(&seq, &DetectorContext::unbounded(), "z_dna").unwrap();
        assert_eq!(found.len(), 1);
        // The closing GT step still scores
        assert_eq!((found[0].start, found[0].end), (5, 37));
    }
}
