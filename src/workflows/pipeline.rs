use super::cache::ResultCache;
use super::config::Config;
use super::conservation::ConservationAnalyzer;
use crate::composite::synthesize;
use crate::motif::{Candidate, CompositeMotif, MotifRecord, ResolvedMotif, ScoredMotif};
use crate::repeats::{ExactRepeatMatcher, RepeatFamily};
use crate::resolve::{drop_invalid, merge_clusters, number_motifs, resolve_overlaps, ResolutionStats};
use crate::scan::{
    AutomatonCache, Detector, DetectorContext, DetectorError, PatternScanner, ScanFamily,
};
use crate::score::ScoringRegistry;
use crate::utils::Result;
use rayon::{
    iter::{IntoParallelRefIterator, ParallelIterator},
    ThreadPoolBuilder,
};
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Structured trail of what happened during a scan; never part of the records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanDiagnostics {
    /// Candidates emitted per detector, summed over scanned windows.
    pub detector_counts: BTreeMap<&'static str, usize>,
    pub detector_time: BTreeMap<&'static str, Duration>,
    pub failures: Vec<DetectorError>,
    /// Candidates with coordinates outside their window, dropped unscored.
    pub malformed: usize,
    pub threshold_removed: usize,
    pub cluster_removed: usize,
    pub boundary_duplicates: usize,
    /// Motifs skipped by a chunk because another chunk owns their start.
    pub boundary_skipped: usize,
    /// Chunk windows grown to hold a motif running into their right edge.
    pub extended_chunks: usize,
    pub resolution: ResolutionStats,
    pub chunks: usize,
    pub cancelled: bool,
    pub sequential_fallback: bool,
    pub elapsed: Duration,
}

impl ScanDiagnostics {
    pub fn total_candidates(&self) -> usize {
        self.detector_counts.values().sum()
    }

    fn record_run(&mut self, run: &DetectorRun) {
        *self.detector_time.entry(run.name).or_default() += run.elapsed;
        let count = self.detector_counts.entry(run.name).or_default();
        if let Ok(candidates) = &run.outcome {
            *count += candidates.len();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutput {
    pub motifs: Vec<ResolvedMotif>,
    pub composites: Vec<CompositeMotif>,
    pub diagnostics: ScanDiagnostics,
    /// Per-ordinal conservation values, when requested and available.
    pub conservation: Option<BTreeMap<usize, f64>>,
}

impl ScanOutput {
    /// Output records in order; composite ordinals continue after the motifs.
    pub fn records(&self, sequence_name: &str, seq: &[u8]) -> Vec<MotifRecord> {
        let mut records: Vec<MotifRecord> = self
            .motifs
            .iter()
            .map(|motif| MotifRecord::from_resolved(sequence_name, motif, seq))
            .collect();
        let offset = records.len();
        records.extend(self.composites.iter().enumerate().map(|(i, composite)| {
            MotifRecord::from_composite(sequence_name, offset + i + 1, composite, seq)
        }));
        records
    }
}

struct DetectorRun {
    name: &'static str,
    outcome: std::result::Result<Vec<Candidate>, DetectorError>,
    elapsed: Duration,
}

/// Runs one detector with its own deadline, turning a panic into an error.
fn run_isolated(detector: &dyn Detector, seq: &[u8], ctx: &DetectorContext) -> DetectorRun {
    let name = detector.name();
    let ctx = ctx.start_clock();
    let started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| detector.detect(seq, &ctx)))
        .unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(DetectorError::Panicked {
                detector: name.to_string(),
                message,
            })
        });
    DetectorRun {
        name,
        outcome,
        elapsed: started.elapsed(),
    }
}

/// Every pattern-family scanner followed by every exact-repeat sub-detector.
pub fn standard_detectors(config: &Config) -> Vec<Box<dyn Detector>> {
    let mut detectors: Vec<Box<dyn Detector>> = Vec::new();
    for family in ScanFamily::ALL {
        detectors.push(Box::new(PatternScanner::new(family)));
    }
    for family in RepeatFamily::ALL {
        detectors.push(Box::new(ExactRepeatMatcher::new(family, config.repeats.clone())));
    }
    detectors
}

fn initialize_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("nbdscan-{}", i))
        .start_handler(|_thread_index| {
            log::trace!("Initialized thread {:?}", std::thread::current().id());
        })
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}

/// The detection engine: detector fan-out, scoring, thresholds, merging,
/// overlap resolution and composite synthesis.
pub struct Scanner {
    pub(super) config: Config,
    detectors: Vec<Box<dyn Detector>>,
    registry: ScoringRegistry,
    automata: Arc<AutomatonCache>,
    pool: Option<rayon::ThreadPool>,
    sequential_fallback: bool,
    pub(super) cache: Option<Arc<ResultCache>>,
    conservation: Option<Box<dyn ConservationAnalyzer>>,
}

impl Scanner {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let detectors = standard_detectors(&config);
        let mut scanner = Scanner {
            config,
            detectors,
            registry: ScoringRegistry::standard(),
            automata: Arc::new(AutomatonCache::new()),
            pool: None,
            sequential_fallback: false,
            cache: None,
            conservation: None,
        };
        scanner.build_pool();
        Ok(scanner)
    }

    fn build_pool(&mut self) {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let workers = self
            .config
            .max_workers
            .unwrap_or_else(|| cores.min(self.detectors.len()))
            .max(1);
        self.pool = None;
        self.sequential_fallback = false;
        if workers == 1 {
            return;
        }
        log::debug!("Initializing thread pool with {} threads...", workers);
        match initialize_thread_pool(workers) {
            Ok(pool) => self.pool = Some(pool),
            Err(e) => {
                log::warn!("{}; running detectors sequentially", e);
                self.sequential_fallback = true;
            }
        }
    }

    /// Replaces the detector set; the worker pool is resized to match.
    pub fn with_detectors(mut self, detectors: Vec<Box<dyn Detector>>) -> Self {
        self.detectors = detectors;
        self.build_pool();
        self
    }

    pub fn with_registry(mut self, registry: ScoringRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Shares a compiled automaton cache with other scanners.
    pub fn with_automata(mut self, automata: Arc<AutomatonCache>) -> Self {
        self.automata = automata;
        self
    }

    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_conservation(mut self, analyzer: Box<dyn ConservationAnalyzer>) -> Self {
        self.conservation = Some(analyzer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    fn context(&self) -> DetectorContext {
        DetectorContext::new(
            self.automata.clone(),
            self.config.backend,
            self.config.detector_timeout,
        )
    }

    /// Runs every detector over `seq` and gathers their outputs in detector
    /// order; nothing downstream starts before all of them finish.
    fn detect_all(&self, seq: &[u8]) -> Vec<DetectorRun> {
        let ctx = self.context();
        match &self.pool {
            Some(pool) => pool.install(|| {
                self.detectors
                    .par_iter()
                    .map(|detector| run_isolated(detector.as_ref(), seq, &ctx))
                    .collect()
            }),
            None => self
                .detectors
                .iter()
                .map(|detector| run_isolated(detector.as_ref(), seq, &ctx))
                .collect(),
        }
    }

    /// Detects, scores and filters the motifs of one chunk. Coordinates stay
    /// relative to `seq`.
    pub(super) fn scan_chunk(
        &self,
        seq: &[u8],
        diagnostics: &mut ScanDiagnostics,
    ) -> Result<Vec<ScoredMotif>> {
        diagnostics.sequential_fallback |= self.sequential_fallback;
        let mut candidates = Vec::new();
        for run in self.detect_all(seq) {
            diagnostics.record_run(&run);
            match run.outcome {
                Ok(found) => {
                    log::trace!("{}: {} candidates in {:?}", run.name, found.len(), run.elapsed);
                    candidates.extend(found);
                }
                Err(err) => {
                    log::error!("Detector failure: {}", err);
                    diagnostics.failures.push(err);
                }
            }
        }
        let before = candidates.len();
        candidates.retain(|c| c.start >= 1 && c.start <= c.end && c.end <= seq.len());
        diagnostics.malformed += before - candidates.len();
        candidates.sort_by_key(|c| (c.start, c.end, c.subclass));

        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            scored.push(self.registry.score(candidate, seq)?);
        }

        let before = scored.len();
        scored.retain(|motif| self.passes_thresholds(motif));
        diagnostics.threshold_removed += before - scored.len();
        Ok(scored)
    }

    fn passes_thresholds(&self, motif: &ScoredMotif) -> bool {
        match self.config.threshold(motif.class()) {
            Some(threshold) => {
                threshold
                    .min_score
                    .map_or(true, |min| motif.normalized_score >= min)
                    && threshold.min_length.map_or(true, |min| motif.len() >= min)
            }
            None => true,
        }
    }

    /// Collapses near-duplicates, resolves overlaps when enabled and derives
    /// the composite overlays. Coordinates are relative to `seq`.
    pub(super) fn finalize(
        &self,
        seq: &[u8],
        scored: Vec<ScoredMotif>,
        diagnostics: &mut ScanDiagnostics,
    ) -> (Vec<ResolvedMotif>, Vec<CompositeMotif>) {
        let before = scored.len();
        let merged = merge_clusters(scored, self.config.merge_distance);
        diagnostics.cluster_removed += before - merged.len();

        let motifs = if self.config.nonoverlap {
            let (resolved, stats) = resolve_overlaps(merged, seq.len(), &self.config.overlap);
            log::debug!(
                "Overlap resolution rejected {} same-class and {} cross-class motifs",
                stats.same_class,
                stats.cross_class
            );
            diagnostics.resolution = stats;
            resolved
        } else {
            let (kept, invalid) = drop_invalid(merged, seq.len());
            diagnostics.resolution.invalid = invalid;
            number_motifs(kept)
        };
        if diagnostics.resolution.invalid > 0 {
            log::debug!(
                "Dropped {} motifs with invalid coordinates",
                diagnostics.resolution.invalid
            );
        }

        let composites = synthesize(
            &motifs,
            self.config.report_hybrids,
            self.config.report_hotspots,
            &self.config.hotspot,
        );
        (motifs, composites)
    }

    /// Runs the conservation collaborator when requested; its failures are
    /// logged and leave the motifs untouched.
    pub(super) fn conservation(
        &self,
        seq: &[u8],
        motifs: &[ResolvedMotif],
    ) -> Option<BTreeMap<usize, f64>> {
        if !self.config.calculate_conservation {
            return None;
        }
        let Some(analyzer) = &self.conservation else {
            log::warn!("Conservation requested but no analyzer is configured");
            return None;
        };
        match analyzer.analyze(seq, motifs) {
            Ok(values) => Some(values),
            Err(e) => {
                log::warn!("Conservation analysis failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motif::{MotifDetails, Subclass};

    struct Panicking;

    impl Detector for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn detect(&self, _: &[u8], _: &DetectorContext) -> std::result::Result<Vec<Candidate>, DetectorError> {
            panic!("bad state")
        }
    }

    struct Spinning;

    impl Detector for Spinning {
        fn name(&self) -> &'static str {
            "spinning"
        }

        fn detect(&self, _: &[u8], ctx: &DetectorContext) -> std::result::Result<Vec<Candidate>, DetectorError> {
            loop {
                ctx.check(self.name())?;
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    }

    struct Fixed(Candidate);

    impl Detector for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn detect(&self, _: &[u8], _: &DetectorContext) -> std::result::Result<Vec<Candidate>, DetectorError> {
            Ok(vec![self.0.clone()])
        }
    }

    fn str_candidate() -> Candidate {
        Candidate::from_span(
            Subclass::Str,
            0,
            14,
            MotifDetails::Tandem {
                unit: "CA".to_string(),
                copies: 7,
                partial: 0,
            },
        )
    }

    #[test]
    fn failing_detectors_do_not_abort_siblings() {
        let config = Config {
            detector_timeout: Some(Duration::from_millis(5)),
            max_workers: Some(3),
            ..Config::default()
        };
        let scanner = Scanner::new(config).unwrap().with_detectors(vec![
            Box::new(Panicking),
            Box::new(Spinning),
            Box::new(Fixed(str_candidate())),
        ]);
        let mut diagnostics = ScanDiagnostics::default();
        let scored = scanner.scan_chunk(b"CACACACACACACA", &mut diagnostics).unwrap();
        assert_eq!(scored.len(), 1);
        assert_eq!(diagnostics.failures.len(), 2);
        assert!(diagnostics
            .failures
            .iter()
            .any(|e| matches!(e, DetectorError::Panicked { .. })));
        assert!(diagnostics
            .failures
            .iter()
            .any(|e| matches!(e, DetectorError::TimedOut { .. })));
        assert_eq!(diagnostics.detector_counts["fixed"], 1);
        assert_eq!(diagnostics.detector_counts["panicking"], 0);
    }

    #[test]
    fn malformed_candidates_are_dropped_unscored() {
        let span = |start, end| Candidate {
            subclass: Subclass::Str,
            start,
            end,
            details: MotifDetails::None,
        };
        let scanner = Scanner::new(Config::default()).unwrap().with_detectors(vec![
            Box::new(Fixed(span(0, 5))),
            Box::new(Fixed(span(9, 4))),
            Box::new(Fixed(span(3, 15))),
            Box::new(Fixed(str_candidate())),
        ]);
        let mut diagnostics = ScanDiagnostics::default();
        let scored = scanner.scan_chunk(b"CACACACACACACA", &mut diagnostics).unwrap();
        assert_eq!(scored.len(), 1);
        assert_eq!(diagnostics.malformed, 3);
    }

    #[test]
    fn missing_scoring_strategy_is_fatal() {
        let scanner = Scanner::new(Config::default())
            .unwrap()
            .with_detectors(vec![Box::new(Fixed(str_candidate()))])
            .with_registry(ScoringRegistry::new());
        let mut diagnostics = ScanDiagnostics::default();
        assert!(scanner
            .scan_chunk(b"CACACACACACACA", &mut diagnostics)
            .is_err());
    }

    #[test]
    fn thresholds_apply_per_class() {
        let mut config = Config::default();
        config.set_min_length(crate::motif::MotifClass::SlippedDna, 20);
        let scanner = Scanner::new(config)
            .unwrap()
            .with_detectors(vec![Box::new(Fixed(str_candidate()))]);
        let mut diagnostics = ScanDiagnostics::default();
        let scored = scanner.scan_chunk(b"CACACACACACACA", &mut diagnostics).unwrap();
        assert!(scored.is_empty());
        assert_eq!(diagnostics.threshold_removed, 1);
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let seq = b"NNGGGTTAGGGTTAGGGTTAGGGNNNNCGCGCGCGCGCGCGCGCGCGNNNNCACACACACACACANNNNAAAAAATTTTTT";
        let automata = Arc::new(AutomatonCache::new());
        let sequential = Scanner::new(Config {
            max_workers: Some(1),
            ..Config::default()
        })
        .unwrap();
        let parallel = Scanner::new(Config {
            max_workers: Some(4),
            ..Config::default()
        })
        .unwrap()
        .with_automata(automata.clone());
        assert!(!sequential.is_parallel());
        let mut first = ScanDiagnostics::default();
        let mut second = ScanDiagnostics::default();
        assert_eq!(
            sequential.scan_chunk(seq, &mut first).unwrap(),
            parallel.scan_chunk(seq, &mut second).unwrap()
        );
        assert_eq!(first.detector_counts, second.detector_counts);
        assert!(!automata.is_empty());
    }
}
