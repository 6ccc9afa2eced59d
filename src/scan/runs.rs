use super::{DetectorContext, DetectorError, PatternSet};

/// Maximal homopolymer run, 0-based half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Run {
    pub start: usize,
    pub end: usize,
}

impl Run {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn center(&self) -> f64 {
        (self.start + self.end) as f64 / 2.0
    }
}

/// Maximal runs of each `(base, min_len)` pair, recovered from overlapping
/// hits of `base` repeated `min_len` times. Returns one sorted list per pair.
pub fn find_runs(
    seq: &[u8],
    ctx: &DetectorContext,
    detector: &str,
    specs: &[(u8, usize)],
) -> Result<Vec<Vec<Run>>, DetectorError> {
    let literals: Vec<Vec<u8>> = specs
        .iter()
        .map(|&(base, min_len)| vec![base; min_len.max(1)])
        .collect();
    let set = PatternSet::new(&literals);
    let hits = ctx.literal_hits(detector, &set, seq)?;

    let mut runs: Vec<Vec<Run>> = vec![Vec::new(); specs.len()];
    for hit in hits {
        let width = literals[hit.pattern].len();
        let list = &mut runs[hit.pattern];
        match list.last_mut() {
            // Consecutive hits extend the current run by one base
            Some(run) if hit.start + width == run.end + 1 => run.end += 1,
            _ => list.push(Run {
                start: hit.start,
                end: hit.start + width,
            }),
        }
    }
    Ok(runs)
}
