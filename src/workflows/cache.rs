use super::pipeline::ScanOutput;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

pub fn sequence_hash(seq: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    seq.hash(&mut hasher);
    hasher.finish()
}

/// Completed scans keyed by sequence hash and configuration fingerprint.
/// A hit returns exactly what a fresh run would produce.
#[derive(Default)]
pub struct ResultCache {
    entries: RwLock<HashMap<(u64, u64), ScanOutput>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, seq_hash: u64, fingerprint: u64) -> Option<ScanOutput> {
        let entries = self.entries.read().ok()?;
        entries.get(&(seq_hash, fingerprint)).cloned()
    }

    pub fn insert(&self, seq_hash: u64, fingerprint: u64, output: ScanOutput) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.entry((seq_hash, fingerprint)).or_insert(output);
            }
            Err(_) => log::warn!("Result cache is poisoned; skipping insert"),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}
