use crate::motif::{MotifClass, ResolvedMotif};
use crate::resolve::IntervalSet;
use std::collections::BTreeMap;

pub const SUMMARY_HEADER: &str =
    "#sequence_name\tclass\tcount\tcovered_bp\tcoverage_pct\tdensity_per_kb\tmean_score";

/// Per-class statistics over resolved motifs. Composite overlays are not
/// counted.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSummary {
    pub class: MotifClass,
    pub count: usize,
    /// Bases covered by at least one motif of the class.
    pub covered_bp: usize,
    pub coverage_pct: f64,
    pub density_per_kb: f64,
    pub mean_score: f64,
}

impl ClassSummary {
    pub fn to_tsv(&self, sequence_name: &str) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{:.2}\t{:.3}\t{:.4}",
            sequence_name,
            self.class.name(),
            self.count,
            self.covered_bp,
            self.coverage_pct,
            self.density_per_kb,
            self.mean_score
        )
    }
}

pub fn summarize(motifs: &[ResolvedMotif], seq_len: usize) -> Vec<ClassSummary> {
    let mut by_class: BTreeMap<MotifClass, Vec<&ResolvedMotif>> = BTreeMap::new();
    for motif in motifs {
        let class = motif.motif.class();
        if !class.is_composite() {
            by_class.entry(class).or_default().push(motif);
        }
    }

    by_class
        .into_iter()
        .map(|(class, members)| {
            let mut covered = IntervalSet::new();
            for motif in &members {
                covered.insert(motif.motif.start(), motif.motif.end());
            }
            let covered_bp = covered.total_len();
            let count = members.len();
            let (coverage_pct, density_per_kb) = if seq_len == 0 {
                (0.0, 0.0)
            } else {
                (
                    covered_bp as f64 * 100.0 / seq_len as f64,
                    count as f64 * 1000.0 / seq_len as f64,
                )
            };
            let mean_score =
                members.iter().map(|m| m.motif.normalized_score).sum::<f64>() / count as f64;
            ClassSummary {
                class,
                count,
                covered_bp,
                coverage_pct,
                density_per_kb,
                mean_score,
            }
        })
        .collect()
}
