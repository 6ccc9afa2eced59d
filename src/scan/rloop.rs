use super::runs::find_runs;
use super::{DetectorContext, DetectorError};
use crate::motif::{Candidate, MotifDetails, Subclass};
use crate::utils::seq::base_fraction;

const RIZ_MIN_RUN: usize = 3;
const RIZ_MIN_RUNS: usize = 3;
const RIZ_MAX_LOOP: usize = 10;
const RIZ_MIN_G: f64 = 0.5;
const REZ_STEP: usize = 10;
const REZ_MIN_G: f64 = 0.4;
const REZ_MAX_LEN: usize = 2000;
const REZ_MIN_LEN: usize = 100;

/// R-loop formation sites: a G-rich initiation zone (RIZ) of chained G-runs
/// followed by a G-rich elongation zone (REZ) of at least 100 bases.
pub fn find_rloops(
    seq: &[u8],
    ctx: &DetectorContext,
    detector: &str,
) -> Result<Vec<Candidate>, DetectorError> {
    let runs = find_runs(seq, ctx, detector, &[(b'G', RIZ_MIN_RUN)])?
        .pop()
        .unwrap_or_default();

    let mut found = Vec::new();
    let mut i = 0;
    while i < runs.len() {
        ctx.check(detector)?;
        let mut last = i;
        while last + 1 < runs.len() && runs[last + 1].start - runs[last].end <= RIZ_MAX_LOOP {
            last += 1;
        }
        let (riz_start, riz_end) = (runs[i].start, runs[last].end);
        let count = last - i + 1;
        i = last + 1;
        if count < RIZ_MIN_RUNS {
            continue;
        }
        if base_fraction(&seq[riz_start..riz_end], b'G') < RIZ_MIN_G {
            continue;
        }

        let mut rez_end = riz_end;
        while rez_end + REZ_STEP <= seq.len()
            && rez_end - riz_end + REZ_STEP <= REZ_MAX_LEN
            && base_fraction(&seq[rez_end..rez_end + REZ_STEP], b'G') >= REZ_MIN_G
        {
            rez_end += REZ_STEP;
        }
        let rez_len = rez_end - riz_end;
        if rez_len >= REZ_MIN_LEN {
            found.push(Candidate::from_span(
                Subclass::RLoopSite,
                riz_start,
                rez_end,
                MotifDetails::Zones {
                    riz_len: riz_end - riz_start,
                    rez_len,
                },
            ));
        }
    }
    Ok(found)
}
