//! Sorted sets of disjoint sweep-time intervals.

use serde::Serialize;

/// A minimal set of closed intervals inside `[0, 1]`.
///
/// Intervals are sorted by start, each has `start <= end`, and any two are
/// separated by a gap. Every constructor establishes this, so [`merge`]
/// can rely on it.
///
/// [`merge`]: IntervalSet::merge
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IntervalSet {
    intervals: Vec<(f64, f64)>,
}

impl IntervalSet {
    /// No sweep times.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The whole sweep, `[0, 1]`.
    pub fn full() -> Self {
        Self {
            intervals: vec![(0.0, 1.0)],
        }
    }

    /// Normalize arbitrary intervals into a minimal set.
    ///
    /// Intervals are clipped to `[0, 1]`; reversed, NaN or fully outside
    /// intervals are dropped, overlapping or touching ones are joined.
    pub fn from_intervals<I>(intervals: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut clipped: Vec<(f64, f64)> = intervals
            .into_iter()
            .filter(|(a, b)| a <= b)
            .map(|(a, b)| (a.max(0.0), b.min(1.0)))
            .filter(|(a, b)| a <= b)
            .collect();
        clipped.sort_by(|x, y| x.0.total_cmp(&y.0));
        Self::from_sorted_runs(clipped)
    }

    /// The intervals in ascending order.
    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }

    /// Whether the set contains no sweep time.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Number of disjoint intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Iterate over the intervals.
    pub fn iter(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.intervals.iter()
    }

    /// Whether `s` lies in one of the intervals (end points included).
    pub fn contains(&self, s: f64) -> bool {
        self.intervals.iter().any(|&(a, b)| a <= s && s <= b)
    }

    /// Summed length of all intervals.
    pub fn measure(&self) -> f64 {
        self.intervals.iter().map(|(a, b)| b - a).sum()
    }

    /// Intersection of two sets.
    ///
    /// Walks both sorted lists once. The pairwise overlaps of two minimal
    /// lists are themselves sorted and separated, so the result is minimal
    /// without further normalization.
    pub fn merge(&self, other: &IntervalSet) -> IntervalSet {
        let (a, b) = (&self.intervals, &other.intervals);
        let (mut i, mut j) = (0, 0);
        let mut out = Vec::new();
        while i < a.len() && j < b.len() {
            let start = a[i].0.max(b[j].0);
            let end = a[i].1.min(b[j].1);
            if start <= end {
                out.push((start, end));
            }
            if a[i].1 < b[j].1 {
                i += 1;
            } else {
                j += 1;
            }
        }
        IntervalSet { intervals: out }
    }

    /// Join overlapping or touching neighbours of intervals sorted by start.
    pub(crate) fn from_sorted_runs(sorted_runs: Vec<(f64, f64)>) -> Self {
        let mut out: Vec<(f64, f64)> = Vec::with_capacity(sorted_runs.len());
        for (a, b) in sorted_runs {
            match out.last_mut() {
                Some(last) if a <= last.1 => last.1 = last.1.max(b),
                _ => out.push((a, b)),
            }
        }
        Self { intervals: out }
    }
}

impl<'a> IntoIterator for &'a IntervalSet {
    type Item = &'a (f64, f64);
    type IntoIter = std::slice::Iter<'a, (f64, f64)>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}
