//! Sets of bin ranges built by boundary toggling.

/// A union of disjoint closed bin ranges, stored as a sorted boundary list.
///
/// Boundaries come in pairs `[start, end]`; a bin is inside the set when an
/// odd number of boundaries lie at or before it within its pair. Adding a
/// range merges it with every range it overlaps or touches, so the list is
/// always the minimal description of the union.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionList {
    bounds: Vec<i32>,
}

impl RegionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the range between `b1` and `b2` (in either order), clipped to
    /// `[low, high]`.
    ///
    /// Returns false if the range lies entirely outside `[low, high]` and
    /// nothing was added.
    pub fn add(&mut self, b1: i32, b2: i32, low: i32, high: i32) -> bool {
        let (min, max) = if b1 <= b2 { (b1, b2) } else { (b2, b1) };
        if max < low || min > high {
            return false;
        }
        let min = min.max(low);
        let max = max.min(high);

        let mut inside = false;
        let mut i = 0;
        while i < self.bounds.len() && self.bounds[i] < min {
            inside = !inside;
            i += 1;
        }
        if !inside {
            self.bounds.insert(i, min);
            i += 1;
        }

        // Boundaries covered by the new range are redundant.
        while i < self.bounds.len() && self.bounds[i] <= max {
            inside = !inside;
            self.bounds.remove(i);
        }
        if !inside {
            self.bounds.insert(i, max);
        }

        debug_assert!(self.bounds.len() % 2 == 0);
        true
    }

    /// Closed ranges in increasing order.
    pub fn pairs(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.bounds.chunks_exact(2).map(|p| (p[0], p[1]))
    }

    pub fn boundaries(&self) -> &[i32] {
        &self.bounds
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn clear(&mut self) {
        self.bounds.clear();
    }

    /// Number of bins covered.
    pub fn bin_count(&self) -> u64 {
        self.pairs()
            .map(|(a, b)| (i64::from(b) - i64::from(a) + 1) as u64)
            .sum()
    }

    /// Check whether `bin` is covered.
    pub fn contains(&self, bin: i32) -> bool {
        self.pairs().any(|(a, b)| a <= bin && bin <= b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(ranges: &[(i32, i32)]) -> RegionList {
        let mut r = RegionList::new();
        for &(a, b) in ranges {
            r.add(a, b, 0, 100);
        }
        r
    }

    #[test]
    fn test_single_range() {
        let r = list(&[(7, 3)]);
        assert_eq!(r.boundaries(), &[3, 7]);
        assert_eq!(r.bin_count(), 5);
    }

    #[test]
    fn test_add_twice_is_idempotent() {
        assert_eq!(list(&[(2, 5), (2, 5)]), list(&[(2, 5)]));
        assert_eq!(list(&[(4, 4), (4, 4)]).boundaries(), &[4, 4]);
    }

    #[test]
    fn test_bridge_merges() {
        let r = list(&[(0, 2), (6, 8)]);
        assert_eq!(r.boundaries(), &[0, 2, 6, 8]);
        let r = list(&[(0, 2), (6, 8), (1, 7)]);
        assert_eq!(r.boundaries(), &[0, 8]);
    }

    #[test]
    fn test_touching_ranges_merge() {
        assert_eq!(list(&[(0, 3), (3, 6)]).boundaries(), &[0, 6]);
        assert_eq!(list(&[(5, 8), (0, 5)]).boundaries(), &[0, 8]);
        // Adjacent but not touching stays split without double counting.
        let r = list(&[(0, 3), (4, 6)]);
        assert_eq!(r.boundaries(), &[0, 3, 4, 6]);
        assert_eq!(r.bin_count(), 7);
    }

    #[test]
    fn test_contained_and_overlapping() {
        assert_eq!(list(&[(0, 10), (2, 5)]).boundaries(), &[0, 10]);
        assert_eq!(list(&[(2, 5), (0, 3)]).boundaries(), &[0, 5]);
        assert_eq!(list(&[(2, 5), (4, 9)]).boundaries(), &[2, 9]);
    }

    #[test]
    fn test_clipping() {
        let mut r = RegionList::new();
        assert!(!r.add(-10, -1, 0, 9));
        assert!(!r.add(10, 20, 0, 9));
        assert!(r.is_empty());
        assert!(r.add(-5, 3, 0, 9));
        assert!(r.add(8, 50, 0, 9));
        assert_eq!(r.boundaries(), &[0, 3, 8, 9]);
        assert!(r.contains(9));
        assert!(!r.contains(5));
    }

    #[test]
    fn test_clear() {
        let mut r = list(&[(1, 2)]);
        r.clear();
        assert!(r.is_empty());
        assert_eq!(r.pairs().count(), 0);
    }
}
