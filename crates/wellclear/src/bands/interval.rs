/**
* Ordered, disjoint unions of closed real intervals.
*
* The band engine builds "none sets" (values certified conflict-free) as
* interval sets, intersecting one set per intruder per region. Unions merge
* intervals whose gap is below an almost-equality threshold so that adjacent
* integer bands lifted to real values fuse into one range.
*/
use serde::{Deserialize, Serialize};

/// Gap below which two intervals are considered contiguous.
const ALMOST: f64 = 1e-8;

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct Interval {
    pub low: f64,
    pub up: f64,
}

impl Interval {
    pub fn new(low: f64, up: f64) -> Self {
        Interval { low, up }
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.up
    }

    pub fn contains(&self, x: f64) -> bool {
        self.low <= x && x <= self.up
    }

    pub fn intersect(&self, other: &Interval) -> Interval {
        Interval::new(self.low.max(other.low), self.up.min(other.up))
    }
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Clone)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    pub fn empty() -> Self {
        IntervalSet { intervals: vec![] }
    }

    /// The set holding a single interval, empty if the interval is.
    pub fn single(low: f64, up: f64) -> Self {
        let mut set = IntervalSet::empty();
        set.union_interval(&Interval::new(low, up));
        set
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn get(&self, i: usize) -> Option<&Interval> {
        self.intervals.get(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter()
    }

    pub fn contains(&self, x: f64) -> bool {
        self.intervals.iter().any(|iv| iv.contains(x))
    }

    /// Total length of all member intervals.
    pub fn measure(&self) -> f64 {
        self.intervals.iter().map(|iv| iv.up - iv.low).sum()
    }

    /// Insert an interval, merging with members it touches within the
    /// almost-equality threshold.
    pub fn union_interval(&mut self, iv: &Interval) {
        if iv.is_empty() {
            return;
        }
        let mut low = iv.low;
        let mut up = iv.up;
        let mut merged = Vec::with_capacity(self.intervals.len() + 1);
        let mut placed = false;
        for member in &self.intervals {
            if member.up < low - ALMOST {
                merged.push(*member);
            } else if member.low > up + ALMOST {
                if !placed {
                    merged.push(Interval::new(low, up));
                    placed = true;
                }
                merged.push(*member);
            } else {
                low = low.min(member.low);
                up = up.max(member.up);
            }
        }
        if !placed {
            merged.push(Interval::new(low, up));
        }
        self.intervals = merged;
    }

    pub fn union(&mut self, other: &IntervalSet) {
        for iv in &other.intervals {
            self.union_interval(iv);
        }
    }

    /// Restrict this set to its intersection with `other`.
    pub fn intersect(&mut self, other: &IntervalSet) {
        let mut result = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.intervals.len() && j < other.intervals.len() {
            let a = &self.intervals[i];
            let b = &other.intervals[j];
            let cut = a.intersect(b);
            if !cut.is_empty() {
                result.push(cut);
            }
            if a.up < b.up {
                i += 1;
            } else {
                j += 1;
            }
        }
        self.intervals = result;
    }

    /// The part of `[low, up]` not covered by this set.
    pub fn complement_within(&self, low: f64, up: f64) -> IntervalSet {
        let mut result = IntervalSet::empty();
        let mut cursor = low;
        for iv in &self.intervals {
            if iv.up < low {
                continue;
            }
            if iv.low > up {
                break;
            }
            if iv.low > cursor + ALMOST {
                result.union_interval(&Interval::new(cursor, iv.low));
            }
            cursor = cursor.max(iv.up);
        }
        if cursor < up - ALMOST {
            result.union_interval(&Interval::new(cursor, up));
        }
        result
    }

    /// Largest member value `≤ x`, scanning down from `x`.
    pub fn nearest_below(&self, x: f64) -> Option<f64> {
        self.intervals
            .iter()
            .rev()
            .find(|iv| iv.low <= x)
            .map(|iv| iv.up.min(x))
    }

    /// Smallest member value `≥ x`, scanning up from `x`.
    pub fn nearest_above(&self, x: f64) -> Option<f64> {
        self.intervals
            .iter()
            .find(|iv| iv.up >= x)
            .map(|iv| iv.low.max(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn union_merges_touching() {
        let mut set = IntervalSet::empty();
        set.union_interval(&Interval::new(0.0, 1.0));
        set.union_interval(&Interval::new(2.0, 3.0));
        assert_eq!(set.len(), 2);
        // bridges the gap
        set.union_interval(&Interval::new(1.0, 2.0));
        assert_eq!(set.len(), 1);
        assert_relative_eq!(set.get(0).unwrap().up, 3.0);
    }

    #[test]
    fn union_almost_equal_gap() {
        let mut set = IntervalSet::empty();
        set.union_interval(&Interval::new(0.0, 1.0));
        set.union_interval(&Interval::new(1.0 + 1e-12, 2.0));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn intersection() {
        let mut a = IntervalSet::empty();
        a.union_interval(&Interval::new(0.0, 5.0));
        a.union_interval(&Interval::new(10.0, 15.0));
        let mut b = IntervalSet::empty();
        b.union_interval(&Interval::new(3.0, 12.0));
        a.intersect(&b);
        assert_eq!(a.len(), 2);
        assert_relative_eq!(a.get(0).unwrap().low, 3.0);
        assert_relative_eq!(a.get(0).unwrap().up, 5.0);
        assert_relative_eq!(a.get(1).unwrap().low, 10.0);
        assert_relative_eq!(a.get(1).unwrap().up, 12.0);
    }

    #[test]
    fn complement() {
        let mut a = IntervalSet::empty();
        a.union_interval(&Interval::new(2.0, 3.0));
        let c = a.complement_within(0.0, 5.0);
        assert_eq!(c.len(), 2);
        assert!(c.contains(1.0));
        assert!(c.contains(4.0));
        assert!(!c.contains(2.5));
    }

    #[test]
    fn nearest() {
        let mut a = IntervalSet::empty();
        a.union_interval(&Interval::new(0.0, 1.0));
        a.union_interval(&Interval::new(4.0, 6.0));
        assert_relative_eq!(a.nearest_below(3.0).unwrap(), 1.0);
        assert_relative_eq!(a.nearest_above(3.0).unwrap(), 4.0);
        assert_relative_eq!(a.nearest_above(5.0).unwrap(), 5.0);
        assert!(a.nearest_above(7.0).is_none());
    }
}
