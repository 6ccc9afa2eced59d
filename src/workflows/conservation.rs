use crate::motif::ResolvedMotif;
use crate::utils::Result;
use std::collections::BTreeMap;

/// External significance analysis, typically re-running the engine on
/// shuffled copies of the sequence. Values are keyed by motif ordinal.
pub trait ConservationAnalyzer: Send + Sync {
    fn analyze(&self, seq: &[u8], motifs: &[ResolvedMotif]) -> Result<BTreeMap<usize, f64>>;
}
