//! Derived overlays over the resolved motif set. Overlays reference their
//! members by ordinal and never alter or remove them.

mod hotspot;
mod hybrid;

pub use hotspot::{find_hotspots, HotspotParams};
pub use hybrid::find_hybrids;

use crate::motif::{CompositeMotif, ResolvedMotif};

/// Hybrid regions (when `hybrids` is set) followed by hotspot regions (when
/// `hotspots` is set), each in coordinate order.
pub fn synthesize(
    motifs: &[ResolvedMotif],
    hybrids: bool,
    hotspots: bool,
    params: &HotspotParams,
) -> Vec<CompositeMotif> {
    let mut composites = Vec::new();
    if hybrids {
        composites.extend(find_hybrids(motifs));
    }
    if hotspots {
        composites.extend(find_hotspots(motifs, params));
    }
    log::debug!(
        "Derived {} composite regions from {} motifs",
        composites.len(),
        motifs.len()
    );
    composites
}
