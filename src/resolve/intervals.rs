use std::collections::BTreeMap;

/// Disjoint set of claimed positions, stored as merged closed intervals keyed
/// by start.
#[derive(Debug, Clone, Default)]
pub struct IntervalSet {
    spans: BTreeMap<usize, usize>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Number of claimed positions.
    pub fn total_len(&self) -> usize {
        self.spans.iter().map(|(&s, &e)| e - s + 1).sum()
    }

    /// Stored intervals that intersect `[start, end]`.
    fn intersecting(&self, start: usize, end: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let first = self
            .spans
            .range(..=start)
            .next_back()
            .filter(|(_, &e)| e >= start)
            .map(|(&s, _)| s)
            .unwrap_or(start);
        self.spans
            .range(first..=end)
            .map(|(&s, &e)| (s, e))
            .filter(move |&(_, e)| e >= start)
    }

    /// Whether any position of `[start, end]` is claimed.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.intersecting(start, end).next().is_some()
    }

    /// Number of positions of `[start, end]` already claimed.
    pub fn covered(&self, start: usize, end: usize) -> usize {
        self.intersecting(start, end)
            .map(|(s, e)| e.min(end) - s.max(start) + 1)
            .sum()
    }

    /// Claims `[start, end]`, merging with touching intervals.
    pub fn insert(&mut self, start: usize, end: usize) {
        let mut new_start = start;
        let mut new_end = end;
        let touching: Vec<(usize, usize)> = self
            .intersecting(start.saturating_sub(1), end + 1)
            .collect();
        for (s, e) in touching {
            new_start = new_start.min(s);
            new_end = new_end.max(e);
            self.spans.remove(&s);
        }
        self.spans.insert(new_start, new_end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_and_overlap() {
        let mut set = IntervalSet::new();
        set.insert(10, 20);
        set.insert(30, 40);
        assert!(set.overlaps(20, 25));
        assert!(!set.overlaps(21, 29));
        assert_eq!(set.covered(15, 35), 6 + 6);
        assert_eq!(set.covered(1, 100), 22);
        assert_eq!(set.covered(41, 50), 0);
    }

    #[test]
    fn touching_intervals_merge() {
        let mut set = IntervalSet::new();
        set.insert(10, 20);
        set.insert(21, 25);
        set.insert(5, 9);
        assert_eq!(set.spans.len(), 1);
        assert_eq!(set.covered(1, 30), 21);
        set.insert(12, 14);
        assert_eq!(set.spans.len(), 1);
    }
}
