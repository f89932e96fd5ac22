use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A half-open offset range `[start, end)` into a text's content.
///
/// Ranges are ordered by `start` ascending and, on equal starts, by `end`
/// descending, so an enclosing range sorts before the ranges it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl Range {
    /// Creates a range. Callers guarantee `start <= end`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted range [{start}, {end})");
        Self { start, end }
    }

    /// Returns the length. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the range is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// True if both ranges share at least one offset.
    #[must_use]
    pub fn overlaps(self, other: Range) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// True if `other` lies completely within `self`.
    #[must_use]
    pub fn includes(self, other: Range) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// True if `self` ends at or before `other` starts.
    #[must_use]
    pub fn precedes(self, other: Range) -> bool {
        self.end <= other.start
    }

    /// Number of shared offsets; negative when the ranges are apart.
    #[must_use]
    pub fn amount_of_overlap(self, other: Range) -> i64 {
        self.end.min(other.end) as i64 - self.start.max(other.start) as i64
    }

    /// Restricts the range to `bounds`. Disjoint ranges collapse to an empty
    /// range at the nearest bound.
    #[must_use]
    pub fn clamp_to(self, bounds: Range) -> Range {
        let start = self.start.clamp(bounds.start, bounds.end);
        let end = self.end.clamp(start, bounds.end);
        Range { start, end }
    }
}

impl Ord for Range {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| other.end.cmp(&self.end))
    }
}

impl PartialOrd for Range {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(Range::new(0, 5), Range::new(4, 6), true)]
    #[case(Range::new(0, 5), Range::new(5, 6), false)]
    #[case(Range::new(2, 2), Range::new(0, 5), false)]
    #[case(Range::new(1, 3), Range::new(0, 5), true)]
    fn overlap(#[case] a: Range, #[case] b: Range, #[case] expected: bool) {
        assert_eq!(a.overlaps(b), expected);
        assert_eq!(b.overlaps(a), expected);
    }

    #[test]
    fn includes_empty_range_at_border() {
        assert!(Range::new(0, 5).includes(Range::new(5, 5)));
        assert!(Range::new(0, 5).includes(Range::new(0, 0)));
        assert!(!Range::new(0, 5).includes(Range::new(4, 6)));
    }

    #[test]
    fn containing_range_sorts_first_on_equal_start() {
        let mut ranges = vec![Range::new(3, 4), Range::new(0, 1), Range::new(0, 5)];
        ranges.sort();
        assert_eq!(
            ranges,
            vec![Range::new(0, 5), Range::new(0, 1), Range::new(3, 4)]
        );
    }

    #[test]
    fn amount_of_overlap_is_negative_for_gaps() {
        assert_eq!(Range::new(0, 4).amount_of_overlap(Range::new(2, 8)), 2);
        assert_eq!(Range::new(0, 2).amount_of_overlap(Range::new(5, 8)), -3);
    }

    #[test]
    fn clamp_to_bounds() {
        let bounds = Range::new(3, 6);
        assert_eq!(Range::new(1, 4).clamp_to(bounds), Range::new(3, 4));
        assert_eq!(Range::new(5, 9).clamp_to(bounds), Range::new(5, 6));
        assert_eq!(Range::new(7, 9).clamp_to(bounds), Range::new(6, 6));
    }

    fn range() -> impl Strategy<Value = Range> {
        (0usize..50, 0usize..50).prop_map(|(a, b)| Range::new(a.min(b), a.max(b)))
    }

    proptest! {
        #[test]
        fn order_is_total_and_consistent(a in range(), b in range()) {
            let lt = a < b;
            let eq = a == b;
            let gt = b < a;
            prop_assert_eq!(u8::from(lt) + u8::from(eq) + u8::from(gt), 1);

            let expected = if a.start == b.start {
                b.end.cmp(&a.end)
            } else {
                a.start.cmp(&b.start)
            };
            prop_assert_eq!(a.cmp(&b), expected);
        }
    }
}
