use super::cache::sequence_hash;
use super::pipeline::{ScanDiagnostics, ScanOutput, Scanner};
use crate::motif::{ScoredMotif, Subclass};
use crate::utils::seq::is_valid_dna;
use crate::utils::{format_number_with_commas, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cooperative cancellation flag, polled between chunks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 0-based half-open chunk spans covering `len` bases, consecutive chunks
/// sharing `overlap` bases. Requires `overlap < size`.
pub fn chunk_spans(len: usize, size: usize, overlap: usize) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    if len == 0 || size == 0 || overlap >= size {
        return spans;
    }
    let step = size - overlap;
    let mut start = 0;
    loop {
        let end = (start + size).min(len);
        spans.push((start, end));
        if end == len {
            break;
        }
        start += step;
    }
    spans
}

/// Start positions (0-based, half-open) each chunk reports. The bases shared
/// by two chunks are split at their midpoint, so every motif start has one
/// owner that sees at least `overlap / 2` bases on either side of it.
fn owned_ranges(chunks: &[(usize, usize)], overlap: usize) -> Vec<(usize, usize)> {
    let half = overlap / 2;
    (0..chunks.len())
        .map(|i| {
            let low = if i == 0 { 0 } else { chunks[i].0 + half };
            let high = match chunks.get(i + 1) {
                Some(&(next_start, _)) => next_start + half,
                None => chunks[i].1,
            };
            (low, high)
        })
        .collect()
}

/// Collapses copies of one motif reported by different chunks: same
/// subclass, start and end within `tolerance`. The better-scoring copy stays.
fn dedup_boundaries(tagged: Vec<(usize, ScoredMotif)>, tolerance: usize) -> (Vec<ScoredMotif>, usize) {
    let mut groups: BTreeMap<Subclass, Vec<(usize, ScoredMotif)>> = BTreeMap::new();
    for (chunk, motif) in tagged {
        groups.entry(motif.subclass()).or_default().push((chunk, motif));
    }

    let mut kept_all = Vec::new();
    let mut duplicates = 0;
    for (_, mut group) in groups {
        group.sort_by_key(|(chunk, m)| (m.start(), m.end(), *chunk));
        // Keyed by (start, end, arrival); twins are a range query on start
        let mut kept: BTreeMap<(usize, usize, usize), (usize, ScoredMotif)> = BTreeMap::new();
        for (arrival, (chunk, motif)) in group.into_iter().enumerate() {
            let low = (motif.start().saturating_sub(tolerance), 0, 0);
            let high = (motif.start() + tolerance, usize::MAX, usize::MAX);
            let twin = kept
                .range(low..=high)
                .rev()
                .find(|(_, (other_chunk, other))| {
                    *other_chunk != chunk && other.end().abs_diff(motif.end()) <= tolerance
                })
                .map(|(key, _)| *key);
            match twin {
                Some(key) => {
                    duplicates += 1;
                    if motif.normalized_score > kept[&key].1.normalized_score {
                        kept.remove(&key);
                        kept.insert((motif.start(), motif.end(), arrival), (chunk, motif));
                    }
                }
                None => {
                    kept.insert((motif.start(), motif.end(), arrival), (chunk, motif));
                }
            }
        }
        kept_all.extend(kept.into_values().map(|(_, m)| m));
    }
    kept_all.sort_by_key(|m| (m.start(), m.end(), m.subclass()));
    (kept_all, duplicates)
}

impl Scanner {
    /// Scans a whole sequence. Results are served from the result cache when
    /// one is attached.
    pub fn scan(&self, seq: &[u8]) -> Result<ScanOutput> {
        self.scan_with(seq, &CancelToken::new(), |_| {})
    }

    /// Scans `seq` chunk by chunk, reporting the fraction of chunks done
    /// through `progress` and stopping early once `cancel` is set. A cancelled
    /// scan returns the motifs of the chunks already processed.
    pub fn scan_with<F>(&self, seq: &[u8], cancel: &CancelToken, mut progress: F) -> Result<ScanOutput>
    where
        F: FnMut(f64),
    {
        let started = Instant::now();
        if !is_valid_dna(seq) {
            log::warn!(
                "Skipping invalid sequence of {} bases (empty or outside ACGTN)",
                seq.len()
            );
            return Ok(ScanOutput::default());
        }

        let key = (sequence_hash(seq), self.config.fingerprint());
        if let Some(cache) = &self.cache {
            if let Some(output) = cache.get(key.0, key.1) {
                log::debug!("Result cache hit for sequence of {} bases", seq.len());
                progress(1.0);
                return Ok(output);
            }
        }

        let chunks = chunk_spans(seq.len(), self.config.chunk_size, self.config.chunk_overlap);
        let owned = owned_ranges(&chunks, self.config.chunk_overlap);
        let step = self.config.chunk_size - self.config.chunk_overlap;
        let half = self.config.chunk_overlap / 2;
        let mut diagnostics = ScanDiagnostics::default();
        let mut tagged = Vec::new();
        for (index, &(chunk_start, chunk_end)) in chunks.iter().enumerate() {
            if cancel.is_cancelled() {
                log::warn!("Scan cancelled after {} of {} chunks", index, chunks.len());
                diagnostics.cancelled = true;
                break;
            }
            let (own_start, own_end) = owned[index];
            let owns = |motif: &ScoredMotif| {
                let start0 = chunk_start + motif.start() - 1;
                own_start <= start0 && start0 < own_end
            };

            // An owned motif this close to the window edge may continue past it
            let mut window_end = chunk_end;
            let scored = loop {
                let scored = self.scan_chunk(&seq[chunk_start..window_end], &mut diagnostics)?;
                let reaches_edge = window_end < seq.len()
                    && scored
                        .iter()
                        .any(|m| owns(m) && chunk_start + m.end() + half >= window_end);
                if !reaches_edge {
                    break scored;
                }
                window_end = (window_end + step).min(seq.len());
                diagnostics.extended_chunks += 1;
                log::debug!(
                    "Extending chunk {} to {} for a motif at its edge",
                    index + 1,
                    window_end
                );
            };

            for motif in scored {
                if !owns(&motif) {
                    diagnostics.boundary_skipped += 1;
                    continue;
                }
                tagged.push((index, motif.shifted(chunk_start)));
            }
            diagnostics.chunks += 1;
            log::debug!(
                "Scanned chunk {}/{} ({}-{})",
                index + 1,
                chunks.len(),
                chunk_start + 1,
                window_end
            );
            progress((index + 1) as f64 / chunks.len() as f64);
        }

        let (scored, duplicates) = dedup_boundaries(tagged, self.config.boundary_tolerance);
        diagnostics.boundary_duplicates = duplicates;

        let (motifs, composites) = self.finalize(seq, scored, &mut diagnostics);
        let conservation = self.conservation(seq, &motifs);
        diagnostics.elapsed = started.elapsed();
        log::debug!(
            "Scanned {} bp in {} chunks: {} motifs, {} composites ({} candidates, {} failures) in {:?}",
            format_number_with_commas(seq.len()),
            diagnostics.chunks,
            motifs.len(),
            composites.len(),
            diagnostics.total_candidates(),
            diagnostics.failures.len(),
            diagnostics.elapsed
        );

        let output = ScanOutput {
            motifs,
            composites,
            diagnostics,
            conservation,
        };
        if let Some(cache) = &self.cache {
            if !output.diagnostics.cancelled {
                cache.insert(key.0, key.1, output.clone());
            }
        }
        Ok(output)
    }
}
