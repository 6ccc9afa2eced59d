//! Overlapping multi-literal matching.
//!
//! A [`PatternSet`] is compiled into a [`LiteralMatcher`]: an Aho-Corasick
//! automaton when available, otherwise one escaped regex per literal restarted
//! one base past every match. Both report the same sorted `(pattern, start)`
//! hits.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::bytes::Regex;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

/// Which matcher implementation to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    /// Aho-Corasick, falling back to the reference scan if it cannot be built.
    #[default]
    Auto,
    Automaton,
    Reference,
}

/// Ordered literal patterns; a pattern's id is its index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternSet {
    patterns: Vec<Vec<u8>>,
}

impl PatternSet {
    pub fn new<P: AsRef<[u8]>>(patterns: &[P]) -> Self {
        PatternSet {
            patterns: patterns.iter().map(|p| p.as_ref().to_vec()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn pattern(&self, id: usize) -> &[u8] {
        &self.patterns[id]
    }

    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hit {
    pub start: usize,
    pub pattern: usize,
}

pub enum LiteralMatcher {
    Automaton(AhoCorasick),
    Reference(Vec<Regex>),
}

impl LiteralMatcher {
    pub fn automaton(set: &PatternSet) -> Result<Self, String> {
        let ac = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .build(&set.patterns)
            .map_err(|e| e.to_string())?;
        Ok(LiteralMatcher::Automaton(ac))
    }

    pub fn reference(set: &PatternSet) -> Result<Self, String> {
        let mut regexes = Vec::with_capacity(set.len());
        for pattern in &set.patterns {
            let literal = std::str::from_utf8(pattern).map_err(|e| e.to_string())?;
            let re = Regex::new(&regex::escape(literal)).map_err(|e| e.to_string())?;
            regexes.push(re);
        }
        Ok(LiteralMatcher::Reference(regexes))
    }

    pub fn is_automaton(&self) -> bool {
        matches!(self, LiteralMatcher::Automaton(_))
    }

    /// Every occurrence of every pattern, overlapping ones included, sorted by
    /// start then pattern id.
    pub fn find_all(&self, seq: &[u8]) -> Vec<Hit> {
        let mut hits = Vec::new();
        match self {
            LiteralMatcher::Automaton(ac) => {
                for mat in ac.find_overlapping_iter(seq) {
                    hits.push(Hit {
                        start: mat.start(),
                        pattern: mat.pattern().as_usize(),
                    });
                }
            }
            LiteralMatcher::Reference(regexes) => {
                for (pattern, re) in regexes.iter().enumerate() {
                    let mut pos = 0;
                    while pos < seq.len() {
                        let Some(mat) = re.find_at(seq, pos) else {
                            break;
                        };
                        hits.push(Hit {
                            start: mat.start(),
                            pattern,
                        });
                        pos = mat.start() + 1;
                    }
                }
            }
        }
        hits.sort_unstable();
        hits
    }
}

/// Compiled matchers keyed by pattern-set content hash. Entries are inserted
/// once and never replaced, so workers can share the cache freely.
#[derive(Default)]
pub struct AutomatonCache {
    entries: RwLock<HashMap<(u64, Backend), Arc<LiteralMatcher>>>,
}

impl AutomatonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_or_build(&self, set: &PatternSet, backend: Backend) -> Result<Arc<LiteralMatcher>, String> {
        let key = (set.content_hash(), backend);
        if let Ok(entries) = self.entries.read() {
            if let Some(matcher) = entries.get(&key) {
                return Ok(Arc::clone(matcher));
            }
        }

        let matcher = Arc::new(compile(set, backend)?);
        match self.entries.write() {
            Ok(mut entries) => Ok(Arc::clone(entries.entry(key).or_insert(matcher))),
            // A poisoned lock only loses the cache entry
            Err(_) => Ok(matcher),
        }
    }
}

fn compile(set: &PatternSet, backend: Backend) -> Result<LiteralMatcher, String> {
    match backend {
        Backend::Reference => LiteralMatcher::reference(set),
        Backend::Automaton => LiteralMatcher::automaton(set),
        Backend::Auto => LiteralMatcher::automaton(set).or_else(|err| {
            log::warn!(
                "Aho-Corasick build failed ({}), using reference matcher",
                err
            );
            LiteralMatcher::reference(set)
        }),
    }
}
