//! Z-seeker dinucleotide model for left-handed Z-DNA propensity.
//!
//! Each dinucleotide step is weighted, then the highest-scoring stretches are
//! found with a Kadane scan that closes a stretch once the running score falls
//! `drop_threshold` below its best value.

use super::ScoringStrategy;
use crate::motif::Candidate;

#[derive(Debug, Clone, PartialEq)]
pub struct ZSeekerParams {
    /// CG and GC steps.
    pub gc_weight: f64,
    /// GT, TG, AC and CA steps.
    pub gt_ac_weight: f64,
    /// AT and TA steps, up to `at_free_steps` in a row.
    pub at_weight: f64,
    pub at_free_steps: usize,
    /// AT steps after the free ones score zero up to this many in a row.
    pub at_neutral_steps: usize,
    pub at_first_penalty: f64,
    pub at_run_penalty: f64,
    pub mismatch_base_penalty: f64,
    pub mismatch_max_penalty: f64,
    pub drop_threshold: f64,
    pub min_score: f64,
}

impl Default for ZSeekerParams {
    fn default() -> Self {
        ZSeekerParams {
            gc_weight: 7.0,
            gt_ac_weight: 1.25,
            at_weight: 0.5,
            at_free_steps: 4,
            at_neutral_steps: 6,
            at_first_penalty: -5.0,
            at_run_penalty: -100.0,
            mismatch_base_penalty: 3.0,
            mismatch_max_penalty: 32.0,
            drop_threshold: 50.0,
            min_score: 50.0,
        }
    }
}

/// Score of every dinucleotide step; `seq.len() - 1` values.
pub fn step_scores(seq: &[u8], params: &ZSeekerParams) -> Vec<f64> {
    let mut scores = Vec::with_capacity(seq.len().saturating_sub(1));
    let mut at_run = 0;
    let mut mismatches: i32 = 0;
    for step in seq.windows(2) {
        let score = match (step[0], step[1]) {
            (b'C', b'G') | (b'G', b'C') => {
                at_run = 0;
                mismatches = 0;
                params.gc_weight
            }
            (b'G', b'T') | (b'T', b'G') | (b'A', b'C') | (b'C', b'A') => {
                at_run = 0;
                mismatches = 0;
                params.gt_ac_weight
            }
            (b'A', b'T') | (b'T', b'A') => {
                at_run += 1;
                mismatches = 0;
                if at_run <= params.at_free_steps {
                    params.at_weight
                } else if at_run <= params.at_neutral_steps {
                    0.0
                } else if at_run == params.at_neutral_steps + 1 {
                    params.at_first_penalty
                } else {
                    params.at_run_penalty
                }
            }
            _ => {
                at_run = 0;
                mismatches += 1;
                let penalty = params.mismatch_base_penalty * 2f64.powi(mismatches.min(16) - 1);
                -penalty.min(params.mismatch_max_penalty)
            }
        };
        scores.push(score);
    }
    scores
}

/// Stretch of steps `[start, end)` with its summed score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZWindow {
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

impl ZWindow {
    /// The bases covered by the steps, 0-based half-open.
    pub fn bases(&self) -> (usize, usize) {
        (self.start, self.end + 1)
    }
}

/// Local maxima of the step scores clearing `min_score`.
pub fn max_subarrays(scores: &[f64], params: &ZSeekerParams) -> Vec<ZWindow> {
    let mut windows = Vec::new();
    let mut current = 0.0;
    let mut current_start = 0;
    let mut best: Option<ZWindow> = None;

    let mut close = |best: &mut Option<ZWindow>| {
        if let Some(window) = best.take() {
            if window.score >= params.min_score {
                windows.push(window);
            }
        }
    };

    for (i, &score) in scores.iter().enumerate() {
        if current <= 0.0 && best.is_none() {
            current = 0.0;
            current_start = i;
        }
        current += score;
        if current > 0.0 && best.map_or(true, |b| current > b.score) {
            best = Some(ZWindow {
                start: current_start,
                end: i + 1,
                score: current,
            });
        }
        let dropped = best.map_or(false, |b| b.score - current > params.drop_threshold);
        if current <= 0.0 || dropped {
            close(&mut best);
            current = 0.0;
            current_start = i + 1;
        }
    }
    close(&mut best);
    windows
}

/// Z-DNA windows of `seq` as 0-based half-open base spans with their scores.
pub fn find_z_windows(seq: &[u8], params: &ZSeekerParams) -> Vec<ZWindow> {
    max_subarrays(&step_scores(seq, params), params)
}

/// Best single-stretch score inside `seq`, without the drop threshold.
pub fn best_stretch(seq: &[u8], params: &ZSeekerParams) -> f64 {
    let mut best = 0.0f64;
    let mut current = 0.0f64;
    for score in step_scores(seq, params) {
        current = (current + score).max(0.0);
        best = best.max(current);
    }
    best
}

/// `z_seeker`: best stretch score of the candidate bases.
#[derive(Debug, Clone, Default)]
pub struct ZSeekerScore {
    params: ZSeekerParams,
}

impl ScoringStrategy for ZSeekerScore {
    fn method(&self) -> &'static str {
        "z_seeker"
    }

    fn raw_score(&self, _candidate: &Candidate, slice: &[u8]) -> f64 {
        best_stretch(slice, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternating_cg_scores_seven_per_step() {
        let seq = b"CG".repeat(16);
        let params = ZSeekerParams::default();
        assert_eq!(best_stretch(&seq, &params), 217.0);
        let windows = find_z_windows(&seq, &params);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].bases(), (0, 32));
        assert_eq!(windows[0].score, 217.0);
    }

    #[test]
    fn at_steps_escalate() {
        let params = ZSeekerParams::default();
        let scores = step_scores(b"ATATATATATA", &params);
        assert_eq!(
            scores,
            vec![0.5, 0.5, 0.5, 0.5, 0.0, 0.0, -5.0, -100.0, -100.0, -100.0]
        );
    }

    #[test]
    fn mismatches_double_up_to_cap() {
        let params = ZSeekerParams::default();
        let scores = step_scores(b"AAAAAAAACG", &params);
        assert_eq!(
            scores,
            vec![-3.0, -6.0, -12.0, -24.0, -32.0, -32.0, -32.0, 1.25, 7.0]
        );
    }

    #[test]
    fn flanked_window_is_closed_by_drop() {
        let mut seq = b"NNNNNNNNNN".to_vec();
        seq.extend(b"CG".repeat(16));
        seq.extend_from_slice(b"NNNNNNNNNN");
        seq.extend(b"GC".repeat(3));
        let windows = find_z_windows(&seq, &ZSeekerParams::default());
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].bases(), (10, 42));
        assert_eq!(windows[0].score, 217.0);
    }

    #[test]
    fn weak_stretches_are_not_reported() {
        assert!(find_z_windows(b"CACACACACACACA", &ZSeekerParams::default()).is_empty());
    }
}
