//! Grammar-driven detectors built on overlapping literal matching.

pub mod automaton;
mod curved;
mod quadruplex;
mod rloop;
mod runs;
mod tandem;
mod zdna;

pub use automaton::{AutomatonCache, Backend, Hit, LiteralMatcher, PatternSet};
pub use curved::find_curved_dna;
pub use quadruplex::{find_g_quadruplexes, find_i_motifs};
pub use rloop::find_rloops;
pub use runs::{find_runs, Run};
pub use tandem::{find_egz, find_sticky_dna};
pub use zdna::find_zdna;

use crate::motif::Candidate;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Failure of one detector; the pipeline logs it and counts zero candidates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("detector '{detector}' exceeded its time limit of {limit_ms} ms")]
    TimedOut { detector: String, limit_ms: u128 },

    #[error("detector '{detector}' panicked: {message}")]
    Panicked { detector: String, message: String },

    #[error("detector '{detector}' failed: {reason}")]
    Failed { detector: String, reason: String },
}

/// Shared read-only state handed to every detector invocation.
#[derive(Clone)]
pub struct DetectorContext {
    automata: Arc<AutomatonCache>,
    backend: Backend,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl DetectorContext {
    pub fn new(automata: Arc<AutomatonCache>, backend: Backend, timeout: Option<Duration>) -> Self {
        DetectorContext {
            automata,
            backend,
            timeout,
            deadline: None,
        }
    }

    /// Context with a private cache, the default backend and no time limit.
    pub fn unbounded() -> Self {
        Self::new(Arc::new(AutomatonCache::new()), Backend::Auto, None)
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Copy whose deadline starts now; called once per detector run.
    pub fn start_clock(&self) -> Self {
        DetectorContext {
            deadline: self.timeout.map(|t| Instant::now() + t),
            ..self.clone()
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn automata(&self) -> &AutomatonCache {
        &self.automata
    }

    /// Cooperative timeout check, polled by detectors inside their main loops.
    pub fn check(&self, detector: &str) -> Result<(), DetectorError> {
        match self.deadline {
            Some(deadline) if Instant::now() > deadline => Err(DetectorError::TimedOut {
                detector: detector.to_string(),
                limit_ms: self.timeout.map(|t| t.as_millis()).unwrap_or(0),
            }),
            _ => Ok(()),
        }
    }

    /// Overlapping hits of `set` in `seq` through the cached matcher.
    pub fn literal_hits(
        &self,
        detector: &str,
        set: &PatternSet,
        seq: &[u8],
    ) -> Result<Vec<Hit>, DetectorError> {
        let matcher = self
            .automata
            .get_or_build(set, self.backend)
            .map_err(|reason| DetectorError::Failed {
                detector: detector.to_string(),
                reason,
            })?;
        Ok(matcher.find_all(seq))
    }
}

/// A stateless detector over an immutable sequence.
pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Unscored candidates found in `seq`, coordinates relative to `seq`.
    fn detect(&self, seq: &[u8], ctx: &DetectorContext) -> Result<Vec<Candidate>, DetectorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanFamily {
    Curved,
    GQuadruplex,
    IMotif,
    Egz,
    RLoop,
    Sticky,
    ZDna,
}

impl ScanFamily {
    pub const ALL: [ScanFamily; 7] = [
        ScanFamily::Curved,
        ScanFamily::GQuadruplex,
        ScanFamily::IMotif,
        ScanFamily::Egz,
        ScanFamily::RLoop,
        ScanFamily::Sticky,
        ScanFamily::ZDna,
    ];
}

/// Grammar detector for one pattern family.
#[derive(Debug, Clone, Copy)]
pub struct PatternScanner {
    family: ScanFamily,
}

impl PatternScanner {
    pub fn new(family: ScanFamily) -> Self {
        PatternScanner { family }
    }

    pub fn family(&self) -> ScanFamily {
        self.family
    }
}

impl Detector for PatternScanner {
    fn name(&self) -> &'static str {
        match self.family {
            ScanFamily::Curved => "curved_dna",
            ScanFamily::GQuadruplex => "g_quadruplex",
            ScanFamily::IMotif => "i_motif",
            ScanFamily::Egz => "egz",
            ScanFamily::RLoop => "r_loop",
            ScanFamily::Sticky => "sticky_dna",
            ScanFamily::ZDna => "z_dna",
        }
    }

    fn detect(&self, seq: &[u8], ctx: &DetectorContext) -> Result<Vec<Candidate>, DetectorError> {
        let name = self.name();
        match self.family {
            ScanFamily::Curved => find_curved_dna(seq, ctx, name),
            ScanFamily::GQuadruplex => find_g_quadruplexes(seq, ctx, name),
            ScanFamily::IMotif => find_i_motifs(seq, ctx, name),
            ScanFamily::Egz => find_egz(seq, ctx, name),
            ScanFamily::RLoop => find_rloops(seq, ctx, name),
            ScanFamily::Sticky => find_sticky_dna(seq, ctx, name),
            ScanFamily::ZDna => find_zdna(seq, ctx, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_deadline_times_out() {
        let ctx = DetectorContext::new(
            Arc::new(AutomatonCache::new()),
            Backend::Auto,
            Some(Duration::from_millis(0)),
        )
        .start_clock();
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(
            ctx.check("str"),
            Err(DetectorError::TimedOut { .. })
        ));
        assert!(DetectorContext::unbounded().check("str").is_ok());
    }

    #[test]
    fn detectors_are_deterministic() {
        let seq = b"AAAAAATTGGGTTAGGGTTAGGGTTAGGGCGCGCGCGCGCGCGCAAAAAAACCCTACCCTACCCTACCC";
        let ctx = DetectorContext::unbounded();
        let reference = DetectorContext::unbounded().with_backend(Backend::Reference);
        for family in ScanFamily::ALL {
            let scanner = PatternScanner::new(family);
            let first = scanner.detect(seq, &ctx).unwrap();
            let second = scanner.detect(seq, &ctx).unwrap();
            assert_eq!(first, second, "{}", scanner.name());
            assert_eq!(first, scanner.detect(seq, &reference).unwrap(), "{}", scanner.name());
        }
    }
}
