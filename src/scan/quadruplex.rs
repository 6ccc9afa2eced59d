//! G-quadruplex and i-motif grammars over G-runs and C-runs.

use super::runs::{find_runs, Run};
use super::{DetectorContext, DetectorError};
use crate::motif::{Candidate, MotifDetails, Subclass};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

const SHORT_LOOP: RangeInclusive<usize> = 1..=7;
const LONG_LOOP: RangeInclusive<usize> = 1..=12;
const BIPARTITE_LINKER: RangeInclusive<usize> = 13..=30;
const MULTIMERIC_MIN_RUNS: usize = 8;

/// One tract of a quadruplex: a run, or two runs joined by a single-base bulge.
#[derive(Debug, Clone, Copy)]
struct Tract {
    start: usize,
    end: usize,
    bulged: bool,
}

impl Tract {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

impl From<Run> for Tract {
    fn from(run: Run) -> Self {
        Tract {
            start: run.start,
            end: run.end,
            bulged: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
    Any,
    /// At least one loop longer than the short-loop limit.
    LongLoop,
    /// At least one bulged tract.
    Bulge,
    /// At least one tract of exactly two bases.
    ShortTract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tracts {
    Runs3,
    Runs2,
    Runs3WithBulges,
}

struct RunGrammar {
    subclass: Subclass,
    tracts: Tracts,
    count: usize,
    loops: &'static [RangeInclusive<usize>],
    requirement: Requirement,
}

impl RunGrammar {
    fn loop_range(&self, gap: usize) -> &RangeInclusive<usize> {
        &self.loops[gap.min(self.loops.len() - 1)]
    }

    fn accepts(&self, tracts: &[Tract], path: &[usize]) -> bool {
        match self.requirement {
            Requirement::Any => true,
            Requirement::LongLoop => path
                .windows(2)
                .any(|w| tracts[w[1]].start - tracts[w[0]].end > *SHORT_LOOP.end()),
            Requirement::Bulge => path.iter().any(|&i| tracts[i].bulged),
            Requirement::ShortTract => path.iter().any(|&i| tracts[i].len() == 2),
        }
    }
}

static G4_GRAMMARS: [RunGrammar; 6] = [
    RunGrammar {
        subclass: Subclass::CanonicalG4,
        tracts: Tracts::Runs3,
        count: 4,
        loops: &[SHORT_LOOP],
        requirement: Requirement::Any,
    },
    RunGrammar {
        subclass: Subclass::RelaxedG4,
        tracts: Tracts::Runs3,
        count: 4,
        loops: &[LONG_LOOP],
        requirement: Requirement::LongLoop,
    },
    RunGrammar {
        subclass: Subclass::BulgedG4,
        tracts: Tracts::Runs3WithBulges,
        count: 4,
        loops: &[SHORT_LOOP],
        requirement: Requirement::Bulge,
    },
    RunGrammar {
        subclass: Subclass::BipartiteG4,
        tracts: Tracts::Runs3,
        count: 4,
        loops: &[SHORT_LOOP, BIPARTITE_LINKER, SHORT_LOOP],
        requirement: Requirement::Any,
    },
    RunGrammar {
        subclass: Subclass::ImperfectG4,
        tracts: Tracts::Runs2,
        count: 4,
        loops: &[SHORT_LOOP],
        requirement: Requirement::ShortTract,
    },
    RunGrammar {
        subclass: Subclass::GTriplex,
        tracts: Tracts::Runs3,
        count: 3,
        loops: &[SHORT_LOOP],
        requirement: Requirement::Any,
    },
];

static I_MOTIF_GRAMMARS: [RunGrammar; 2] = [
    RunGrammar {
        subclass: Subclass::CanonicalIMotif,
        tracts: Tracts::Runs3,
        count: 4,
        loops: &[SHORT_LOOP],
        requirement: Requirement::Any,
    },
    RunGrammar {
        subclass: Subclass::RelaxedIMotif,
        tracts: Tracts::Runs3,
        count: 4,
        loops: &[LONG_LOOP],
        requirement: Requirement::LongLoop,
    },
];

static AC_MOTIFS: Lazy<Result<Vec<Regex>, String>> = Lazy::new(|| {
    [
        "A{3}[ACGT]{4,6}C{3}[ACGT]{4,6}C{3}[ACGT]{4,6}C{3}",
        "C{3}[ACGT]{4,6}C{3}[ACGT]{4,6}C{3}[ACGT]{4,6}A{3}",
    ]
    .iter()
    .map(|p| Regex::new(p).map_err(|e| e.to_string()))
    .collect()
});

/// Tract lists for one base: runs of at least 3, runs of at least 2, and runs
/// of at least 3 plus bulged tracts.
struct TractSets {
    runs3: Vec<Tract>,
    runs2: Vec<Tract>,
    bulged: Vec<Tract>,
}

impl TractSets {
    fn build(
        seq: &[u8],
        base: u8,
        ctx: &DetectorContext,
        detector: &str,
    ) -> Result<(Self, Vec<Run>), DetectorError> {
        let mut runs = find_runs(seq, ctx, detector, &[(base, 3), (base, 2)])?;
        let runs2 = runs.pop().unwrap_or_default();
        let runs3 = runs.pop().unwrap_or_default();

        let mut bulged: Vec<Tract> = runs3.iter().copied().map(Tract::from).collect();
        bulged.extend(
            runs2
                .windows(2)
                .filter(|w| w[1].start == w[0].end + 1)
                .map(|w| Tract {
                    start: w[0].start,
                    end: w[1].end,
                    bulged: true,
                }),
        );
        bulged.sort_by_key(|t| (t.start, t.end));

        let sets = TractSets {
            runs3: runs3.iter().copied().map(Tract::from).collect(),
            runs2: runs2.into_iter().map(Tract::from).collect(),
            bulged,
        };
        Ok((sets, runs3))
    }

    fn get(&self, kind: Tracts) -> &[Tract] {
        match kind {
            Tracts::Runs3 => &self.runs3,
            Tracts::Runs2 => &self.runs2,
            Tracts::Runs3WithBulges => &self.bulged,
        }
    }
}

fn extend_chain(
    tracts: &[Tract],
    grammar: &RunGrammar,
    path: &mut Vec<usize>,
    spans: &mut BTreeSet<(usize, usize)>,
) {
    if path.len() == grammar.count {
        if grammar.accepts(tracts, path) {
            spans.insert((tracts[path[0]].start, tracts[path[path.len() - 1]].end));
        }
        return;
    }
    let prev = tracts[path[path.len() - 1]];
    let range = grammar.loop_range(path.len() - 1);
    let lo = prev.end + range.start();
    let hi = prev.end + range.end();
    let from = tracts.partition_point(|t| t.start < lo);
    for next in from..tracts.len() {
        if tracts[next].start > hi {
            break;
        }
        path.push(next);
        extend_chain(tracts, grammar, path, spans);
        path.pop();
    }
}

fn match_grammar(
    tracts: &[Tract],
    grammar: &RunGrammar,
    ctx: &DetectorContext,
    detector: &str,
) -> Result<Vec<Candidate>, DetectorError> {
    let mut spans = BTreeSet::new();
    let mut path = Vec::with_capacity(grammar.count);
    for first in 0..tracts.len() {
        if first % 256 == 0 {
            ctx.check(detector)?;
        }
        path.push(first);
        extend_chain(tracts, grammar, &mut path, &mut spans);
        path.pop();
    }
    Ok(spans
        .into_iter()
        .map(|(start, end)| {
            Candidate::from_span(
                grammar.subclass,
                start,
                end,
                MotifDetails::Runs {
                    count: grammar.count,
                },
            )
        })
        .collect())
}

/// Maximal chains of at least eight runs joined by loops of 1..=12 bases.
fn multimeric(runs: &[Run]) -> Vec<Candidate> {
    let mut found = Vec::new();
    let mut i = 0;
    while i < runs.len() {
        let mut last = i;
        while last + 1 < runs.len() && LONG_LOOP.contains(&(runs[last + 1].start - runs[last].end))
        {
            last += 1;
        }
        let count = last - i + 1;
        if count >= MULTIMERIC_MIN_RUNS {
            found.push(Candidate::from_span(
                Subclass::MultimericG4,
                runs[i].start,
                runs[last].end,
                MotifDetails::Runs { count },
            ));
        }
        i = last + 1;
    }
    found
}

/// G-quadruplex family: multimeric, canonical, relaxed, bulged, bipartite,
/// imperfect and G-triplex grammars over G-runs.
pub fn find_g_quadruplexes(
    seq: &[u8],
    ctx: &DetectorContext,
    detector: &str,
) -> Result<Vec<Candidate>, DetectorError> {
    let (sets, runs3) = TractSets::build(seq, b'G', ctx, detector)?;
    let mut found = multimeric(&runs3);
    for grammar in &G4_GRAMMARS {
        found.extend(match_grammar(sets.get(grammar.tracts), grammar, ctx, detector)?);
    }
    found.sort_by_key(|c| (c.start, c.end, c.subclass));
    Ok(found)
}

/// i-motif family: canonical and relaxed C-run grammars plus AC-motifs.
pub fn find_i_motifs(
    seq: &[u8],
    ctx: &DetectorContext,
    detector: &str,
) -> Result<Vec<Candidate>, DetectorError> {
    let (sets, _) = TractSets::build(seq, b'C', ctx, detector)?;
    let mut found = Vec::new();
    for grammar in &I_MOTIF_GRAMMARS {
        found.extend(match_grammar(sets.get(grammar.tracts), grammar, ctx, detector)?);
    }

    let regexes = AC_MOTIFS.as_ref().map_err(|reason| DetectorError::Failed {
        detector: detector.to_string(),
        reason: reason.clone(),
    })?;
    let mut spans = BTreeSet::new();
    for re in regexes {
        let mut pos = 0;
        while let Some(mat) = re.find_at(seq, pos) {
            spans.insert((mat.start(), mat.end()));
            pos = mat.start() + 1;
        }
    }
    found.extend(spans.into_iter().map(|(start, end)| {
        Candidate::from_span(Subclass::AcMotif, start, end, MotifDetails::Runs { count: 4 })
    }));

    found.sort_by_key(|c| (c.start, c.end, c.subclass));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g4(seq: &[u8]) -> Vec<Candidate> {
        find_g_quadruplexes(seq, &DetectorContext::unbounded(), "g_quadruplex").unwrap()
    }

    fn of(found: &[Candidate], subclass: Subclass) -> Vec<(usize, usize)> {
        found
            .iter()
            .filter(|c| c.subclass == subclass)
            .map(|c| (c.start, c.end))
            .collect()
    }

    #[test]
    fn telomeric_repeat_is_canonical() {
        let found = g4(b"GGGTTAGGGTTAGGGTTAGGG");
        assert_eq!(of(&found, Subclass::CanonicalG4), vec![(1, 21)]);
        assert_eq!(of(&found, Subclass::GTriplex), vec![(1, 15), (7, 21)]);
        assert!(of(&found, Subclass::RelaxedG4).is_empty());
        assert!(of(&found, Subclass::BulgedG4).is_empty());
        assert!(of(&found, Subclass::ImperfectG4).is_empty());
        assert!(of(&found, Subclass::MultimericG4).is_empty());
    }

    #[test]
    fn long_loop_is_relaxed() {
        let found = g4(b"GGGTTAGGGTTATTATTAGGGTTAGGG");
        assert!(of(&found, Subclass::CanonicalG4).is_empty());
        assert_eq!(of(&found, Subclass::RelaxedG4), vec![(1, 27)]);
    }

    #[test]
    fn bipartite_linker() {
        let seq = b"GGGTTGGGTTTTTTTTTTTTTTTGGGTTGGG";
        let found = g4(seq);
        assert_eq!(of(&found, Subclass::BipartiteG4), vec![(1, 31)]);
    }

    #[test]
    fn bulge_and_short_tract() {
        let found = g4(b"GGAGGTTGGGTTGGGTTGGG");
        assert_eq!(of(&found, Subclass::BulgedG4), vec![(1, 20)]);

        let found = g4(b"GGTTGGGTTGGGTTGGG");
        assert_eq!(of(&found, Subclass::ImperfectG4), vec![(1, 17)]);
        assert!(of(&found, Subclass::CanonicalG4).is_empty());
    }

    #[test]
    fn eight_runs_are_multimeric() {
        let seq = b"GGGTGGGTGGGTGGGTGGGTGGGTGGGTGGG";
        let found = g4(seq);
        assert_eq!(of(&found, Subclass::MultimericG4), vec![(1, 31)]);
    }

    #[test]
    fn i_motif_and_ac_motif() {
        let ctx = DetectorContext::unbounded();
        let found = find_i_motifs(b"CCCTAACCCTAACCCTAACCC", &ctx, "i_motif").unwrap();
        assert_eq!(of(&found, Subclass::CanonicalIMotif), vec![(1, 21)]);

        let found = find_i_motifs(b"AAATTTTCCCTTTTCCCTTTTCCC", &ctx, "i_motif").unwrap();
        assert_eq!(of(&found, Subclass::AcMotif), vec![(1, 24)]);
    }
}
