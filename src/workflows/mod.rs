//! End-to-end scanning: detector fan-out, scoring and filtering per chunk,
//! boundary stitching, resolution and composite synthesis.

mod cache;
mod config;
mod conservation;
mod pipeline;
mod summary;
mod windowed;

pub use cache::{sequence_hash, ResultCache};
pub use config::{
    parse_class_value, ClassThreshold, Config, DEFAULT_BOUNDARY_TOLERANCE, DEFAULT_CHUNK_OVERLAP,
    DEFAULT_CHUNK_SIZE,
};
pub use conservation::ConservationAnalyzer;
pub use pipeline::{standard_detectors, ScanDiagnostics, ScanOutput, Scanner};
pub use summary::{summarize, ClassSummary, SUMMARY_HEADER};
pub use windowed::{chunk_spans, CancelToken};
