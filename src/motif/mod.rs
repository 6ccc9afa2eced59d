mod record;
pub mod taxonomy;

pub use record::{MotifRecord, RECORD_HEADER};
pub use taxonomy::{lookup, taxonomy_id, MotifClass, Subclass, TaxonomyEntry};

use arrayvec::ArrayVec;
use itertools::Itertools;
use std::fmt;

/// Structural parameters a detector reports alongside the span.
#[derive(Debug, Clone, PartialEq)]
pub enum MotifDetails {
    None,
    /// Tandem copies of `unit`, plus `partial` trailing bases of an incomplete copy.
    Tandem {
        unit: String,
        copies: usize,
        partial: usize,
    },
    /// Two copies of a `unit_len` block separated by `spacer` bases.
    Spaced { unit_len: usize, spacer: usize },
    /// Two arms of `arm_len` around a `spacer` loop.
    Stem {
        arm_len: usize,
        spacer: usize,
        purity: f64,
    },
    /// Number of G-/C-/A-runs or tracts composing the motif.
    Runs { count: usize },
    /// Initiation and elongation zone lengths of an R-loop site.
    Zones { riz_len: usize, rez_len: usize },
}

impl fmt::Display for MotifDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotifDetails::None => f.write_str("."),
            MotifDetails::Tandem {
                unit,
                copies,
                partial,
            } => write!(f, "unit={};copies={};partial={}", unit, copies, partial),
            MotifDetails::Spaced { unit_len, spacer } => {
                write!(f, "unit_len={};spacer={}", unit_len, spacer)
            }
            MotifDetails::Stem {
                arm_len,
                spacer,
                purity,
            } => write!(f, "arm_len={};spacer={};purity={:.2}", arm_len, spacer, purity),
            MotifDetails::Runs { count } => write!(f, "runs={}", count),
            MotifDetails::Zones { riz_len, rez_len } => {
                write!(f, "riz_len={};rez_len={}", riz_len, rez_len)
            }
        }
    }
}

/// Unscored detection. Coordinates are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub subclass: Subclass,
    pub start: usize,
    pub end: usize,
    pub details: MotifDetails,
}

impl Candidate {
    /// Builds a candidate from a 0-based half-open detector span.
    pub fn from_span(subclass: Subclass, start: usize, end: usize, details: MotifDetails) -> Self {
        Candidate {
            subclass,
            start: start + 1,
            end,
            details,
        }
    }

    pub fn class(&self) -> MotifClass {
        self.subclass.class()
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The matched bases, or an empty slice when the coordinates fall outside `seq`.
    pub fn slice<'a>(&self, seq: &'a [u8]) -> &'a [u8] {
        if self.start == 0 || self.start > self.end || self.end > seq.len() {
            return &[];
        }
        &seq[self.start - 1..self.end]
    }

    /// Copy of the candidate shifted by `offset` bases (chunk to global coordinates).
    pub fn shifted(&self, offset: usize) -> Self {
        Candidate {
            start: self.start + offset,
            end: self.end + offset,
            ..self.clone()
        }
    }
}

/// Candidate plus its class-specific raw score and normalized score in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMotif {
    pub candidate: Candidate,
    pub raw_score: f64,
    pub normalized_score: f64,
    pub method: &'static str,
}

impl ScoredMotif {
    pub fn class(&self) -> MotifClass {
        self.candidate.class()
    }

    pub fn subclass(&self) -> Subclass {
        self.candidate.subclass
    }

    pub fn start(&self) -> usize {
        self.candidate.start
    }

    pub fn end(&self) -> usize {
        self.candidate.end
    }

    pub fn len(&self) -> usize {
        self.candidate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidate.is_empty()
    }

    pub fn shifted(&self, offset: usize) -> Self {
        ScoredMotif {
            candidate: self.candidate.shifted(offset),
            ..self.clone()
        }
    }
}

/// Motif retained after overlap resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMotif {
    pub ordinal: usize,
    pub motif: ScoredMotif,
    pub taxonomy_id: String,
}

impl ResolvedMotif {
    pub fn new(ordinal: usize, motif: ScoredMotif) -> Self {
        let taxonomy_id = taxonomy_id(motif.subclass(), motif.start(), motif.end());
        ResolvedMotif {
            ordinal,
            motif,
            taxonomy_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    Hybrid,
    Cluster,
}

impl CompositeKind {
    pub fn subclass(self) -> Subclass {
        match self {
            CompositeKind::Hybrid => Subclass::Hybrid,
            CompositeKind::Cluster => Subclass::Hotspot,
        }
    }
}

pub type ClassSet = ArrayVec<MotifClass, 8>;

/// Read-only overlay derived from resolved motifs; never owns its members.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeMotif {
    pub kind: CompositeKind,
    pub start: usize,
    pub end: usize,
    /// Ordinals of the contributing resolved motifs.
    pub members: Vec<usize>,
    pub classes: ClassSet,
    pub raw_score: f64,
    pub normalized_score: f64,
}

impl CompositeMotif {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn class_label(&self) -> String {
        self.classes.iter().map(|c| c.name()).join("_")
    }
}
