use super::{taxonomy_id, CompositeKind, CompositeMotif, MotifClass, ResolvedMotif};
use crate::utils::seq::gc_percent;

pub const RECORD_HEADER: &str = "#ordinal\tsequence_name\tclass\tsubclass\tstart\tend\tlength\traw_score\tnormalized_score\tscoring_method\tgc_percent\tsequence\ttaxonomy_id\tdetails";

/// Output record consumed by exporters and front-ends.
#[derive(Debug, Clone, PartialEq)]
pub struct MotifRecord {
    pub ordinal: usize,
    pub sequence_name: String,
    pub class: MotifClass,
    pub class_name: String,
    pub subclass_name: String,
    pub start: usize,
    pub end: usize,
    pub length: usize,
    pub raw_score: f64,
    pub normalized_score: f64,
    pub scoring_method: String,
    pub gc_percent: f64,
    pub sequence: String,
    pub taxonomy_id: String,
    pub details: String,
}

impl MotifRecord {
    pub fn from_resolved(sequence_name: &str, motif: &ResolvedMotif, seq: &[u8]) -> Self {
        let scored = &motif.motif;
        let slice = scored.candidate.slice(seq);
        MotifRecord {
            ordinal: motif.ordinal,
            sequence_name: sequence_name.to_string(),
            class: scored.class(),
            class_name: scored.class().name().to_string(),
            subclass_name: scored.subclass().name().to_string(),
            start: scored.start(),
            end: scored.end(),
            length: scored.len(),
            raw_score: scored.raw_score,
            normalized_score: scored.normalized_score,
            scoring_method: scored.method.to_string(),
            gc_percent: gc_percent(slice),
            sequence: String::from_utf8_lossy(slice).into_owned(),
            taxonomy_id: motif.taxonomy_id.clone(),
            details: scored.candidate.details.to_string(),
        }
    }

    pub fn from_composite(
        sequence_name: &str,
        ordinal: usize,
        composite: &CompositeMotif,
        seq: &[u8],
    ) -> Self {
        let subclass = composite.kind.subclass();
        let slice = seq
            .get(composite.start.saturating_sub(1)..composite.end.min(seq.len()))
            .unwrap_or(&[]);
        let (method, subclass_name) = match composite.kind {
            CompositeKind::Hybrid => ("hybrid_diversity", composite.class_label()),
            CompositeKind::Cluster => (
                "hotspot_density",
                format!("Mixed_Cluster_{}_classes", composite.classes.len()),
            ),
        };
        MotifRecord {
            ordinal,
            sequence_name: sequence_name.to_string(),
            class: subclass.class(),
            class_name: subclass.class().name().to_string(),
            subclass_name,
            start: composite.start,
            end: composite.end,
            length: composite.len(),
            raw_score: composite.raw_score,
            normalized_score: composite.normalized_score,
            scoring_method: method.to_string(),
            gc_percent: gc_percent(slice),
            sequence: String::from_utf8_lossy(slice).into_owned(),
            taxonomy_id: taxonomy_id(subclass, composite.start, composite.end),
            details: format!(
                "members={};classes={}",
                composite.members.len(),
                composite.class_label()
            ),
        }
    }

    pub fn to_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.4}\t{:.4}\t{}\t{:.2}\t{}\t{}\t{}",
            self.ordinal,
            self.sequence_name,
            self.class_name,
            self.subclass_name,
            self.start,
            self.end,
            self.length,
            self.raw_score,
            self.normalized_score,
            self.scoring_method,
            self.gc_percent,
            self.sequence,
            self.taxonomy_id,
            self.details
        )
    }
}
