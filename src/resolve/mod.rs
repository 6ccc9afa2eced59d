//! Deduplication and overlap resolution of scored motifs.

mod cluster;
mod intervals;
mod overlap;

pub use cluster::{merge_clusters, DEFAULT_MERGE_DISTANCE};
pub use intervals::IntervalSet;
pub use overlap::{
    drop_invalid, number_motifs, resolve_overlaps, OverlapPolicy, ResolutionStats,
    DEFAULT_CLASS_PRIORITY, DEFAULT_OVERLAP_BUDGET,
};
