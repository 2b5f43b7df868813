//! A contiguous interval of indices, described by a start and a length.

use std::ops;

/// A contiguous, half-open interval of indices `[start, start + length)`.
///
/// A `length` of zero denotes an empty range; mutating operations treat empty
/// ranges as no-ops. Ranges are plain values: copying one never aliases any
/// container state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Range {
    /// The first index covered by the range (counting from 0).
    pub start: u64,
    /// The number of indices in the range (can be 0).
    pub length: u64,
}

impl Range {
    #[inline]
    pub fn new(start: u64, length: u64) -> Range {
        debug_assert!(start.checked_add(length).is_some());
        Range { start, length }
    }

    /// A range covering the single index `index`.
    #[inline]
    pub fn point(index: u64) -> Range {
        Range::new(index, 1)
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The exclusive upper bound of the range.
    #[inline]
    pub fn end(&self) -> u64 {
        debug_assert!(self.start.checked_add(self.length).is_some());
        self.start + self.length
    }

    /// The exclusive upper bound, or `None` if it is not representable.
    #[inline]
    pub fn checked_end(&self) -> Option<u64> {
        self.start.checked_add(self.length)
    }

    /// The last index covered by the range, or `None` for an empty range.
    #[inline]
    pub fn last(&self) -> Option<u64> {
        (!self.is_empty()).then(|| self.end() - 1)
    }

    /// The index at the center of the range.
    #[inline]
    pub fn center(&self) -> u64 {
        self.start + self.length / 2
    }

    /// Checks whether `index` falls inside the range.
    #[inline]
    pub fn contains(&self, index: u64) -> bool {
        index >= self.start && index < self.end()
    }

    /// Returns the smallest range covering both `self` and `other`.
    #[inline]
    pub fn union(&self, other: Range) -> Range {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        Range::new(start, end - start)
    }

    /// Returns the overlap of `self` and `other`, or `None` when the two
    /// ranges are disjoint. Also serves as a cheap overlap test.
    pub fn intersection(&self, other: Range) -> Option<Range> {
        let start = self.start.max(other.start);
        let end = self.end().min(other.end());
        (end > start).then(|| Range::new(start, end - start))
    }

    /// Merges `next` into `self` when the two runs touch or overlap and
    /// `next` does not start before `self`; otherwise hands both back.
    #[inline]
    pub fn coalesce(self, next: Range) -> Result<Range, (Range, Range)> {
        if self.start <= next.start && next.start <= self.end() {
            let end = self.end().max(next.end());
            Ok(Range::new(self.start, end - self.start))
        } else {
            Err((self, next))
        }
    }
}

impl From<ops::Range<u64>> for Range {
    #[inline]
    fn from(r: ops::Range<u64>) -> Range {
        debug_assert!(r.start <= r.end);
        Range::new(r.start, r.end.saturating_sub(r.start))
    }
}

impl From<Range> for ops::Range<u64> {
    #[inline]
    fn from(r: Range) -> ops::Range<u64> {
        r.start..r.end()
    }
}
