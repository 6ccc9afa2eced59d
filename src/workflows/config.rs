use crate::composite::HotspotParams;
use crate::motif::{lookup, MotifClass};
use crate::repeats::RepeatParams;
use crate::resolve::{OverlapPolicy, DEFAULT_MERGE_DISTANCE};
use crate::scan::Backend;
use crate::utils::Result;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::time::Duration;

pub const DEFAULT_CHUNK_SIZE: usize = 100_000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 1_000;
pub const DEFAULT_BOUNDARY_TOLERANCE: usize = 5;

/// Per-class filters applied once, right after scoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassThreshold {
    /// Minimum normalized score.
    pub min_score: Option<f64>,
    pub min_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Resolve overlaps; otherwise only near-duplicates are merged.
    pub nonoverlap: bool,
    pub report_hotspots: bool,
    pub report_hybrids: bool,
    pub calculate_conservation: bool,
    /// Detector workers; defaults to `min(cores, detectors)`.
    pub max_workers: Option<usize>,
    pub thresholds: BTreeMap<MotifClass, ClassThreshold>,
    pub merge_distance: usize,
    pub overlap: OverlapPolicy,
    pub hotspot: HotspotParams,
    pub repeats: RepeatParams,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Largest start/end difference for two chunk copies of one motif.
    pub boundary_tolerance: usize,
    pub detector_timeout: Option<Duration>,
    pub backend: Backend,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            nonoverlap: false,
            report_hotspots: false,
            report_hybrids: true,
            calculate_conservation: false,
            max_workers: None,
            thresholds: BTreeMap::new(),
            merge_distance: DEFAULT_MERGE_DISTANCE,
            overlap: OverlapPolicy::default(),
            hotspot: HotspotParams::default(),
            repeats: RepeatParams::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            boundary_tolerance: DEFAULT_BOUNDARY_TOLERANCE,
            detector_timeout: None,
            backend: Backend::Auto,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err("Chunk size must be positive".into());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "Chunk overlap ({}) must be smaller than the chunk size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }
        if !(0.0..=1.0).contains(&self.overlap.overlap_budget) {
            return Err(format!(
                "Overlap budget must be within [0, 1], got {}",
                self.overlap.overlap_budget
            ));
        }
        if self.hotspot.window == 0 {
            return Err("Hotspot window must be positive".into());
        }
        if self.max_workers == Some(0) {
            return Err("Number of workers must be positive".into());
        }
        if self.repeats.seed_k == 0 || self.repeats.stem_seed_k == 0 {
            return Err("Repeat seed size must be positive".into());
        }
        Ok(())
    }

    /// Hash of every option, used as part of result cache keys.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        format!("{:?}", self).hash(&mut hasher);
        hasher.finish()
    }

    pub fn threshold(&self, class: MotifClass) -> Option<&ClassThreshold> {
        self.thresholds.get(&class)
    }

    pub fn set_min_score(&mut self, class: MotifClass, value: f64) {
        self.thresholds.entry(class).or_default().min_score = Some(value);
    }

    pub fn set_min_length(&mut self, class: MotifClass, value: usize) {
        self.thresholds.entry(class).or_default().min_length = Some(value);
    }
}

/// Parses `CLASS=VALUE`, resolving the class label through the taxonomy.
pub fn parse_class_value<T: std::str::FromStr>(s: &str) -> Result<(MotifClass, T)> {
    let (label, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected CLASS=VALUE, got '{}'", s))?;
    let entry = lookup(label).ok_or_else(|| format!("Unknown motif class '{}'", label))?;
    if entry.class.is_composite() {
        return Err(format!("Thresholds do not apply to {}", entry.class_name));
    }
    let value = value
        .trim()
        .parse::<T>()
        .map_err(|_| format!("Invalid value '{}' for {}", value, entry.class_name))?;
    Ok((entry.class, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn overlap_must_fit_in_chunk() {
        let config = Config {
            chunk_size: 1000,
            chunk_overlap: 1000,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn fingerprint_tracks_options() {
        let base = Config::default();
        let mut other = Config::default();
        assert_eq!(base.fingerprint(), other.fingerprint());
        other.set_min_score(MotifClass::GQuadruplex, 0.3);
        assert_ne!(base.fingerprint(), other.fingerprint());
    }

    #[test]
    fn class_value_parsing() {
        let (class, value) = parse_class_value::<f64>("g4=0.25").unwrap();
        assert_eq!(class, MotifClass::GQuadruplex);
        assert_eq!(value, 0.25);
        let (class, value) = parse_class_value::<usize>("Slipped_DNA=20").unwrap();
        assert_eq!(class, MotifClass::SlippedDna);
        assert_eq!(value, 20);
        assert!(parse_class_value::<f64>("g4").is_err());
        assert!(parse_class_value::<f64>("B-DNA=1").is_err());
        assert!(parse_class_value::<f64>("hotspot=1").is_err());
        assert!(parse_class_value::<usize>("g4=abc").is_err());
    }
}
