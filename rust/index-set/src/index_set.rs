//! A set of unique unsigned integer indices, stored as sorted runs.

use std::fmt;

use itertools::Itertools;
use log::trace;
use shared_ref::Shared;

use crate::error::{Error, Result};
use crate::range::Range;
use crate::verify_arg;

bitflags::bitflags! {
    /// Flags controlling the order of [`IndexSet::enumerate`] and
    /// [`IndexSet::enumerate_in_range`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EnumerateFlags: u32 {
        /// Visit members in descending order.
        const REVERSE = 1;
    }
}

/// An ordering relation used by [`IndexSet::index_satisfying`] to find the
/// member nearest to a queried index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// The smallest member strictly greater than the queried index.
    GreaterThan,
    /// The smallest member greater than or equal to the queried index.
    GreaterThanOrEqual,
    /// The largest member strictly less than the queried index.
    LessThan,
    /// The largest member less than or equal to the queried index.
    LessThanOrEqual,
}

/// A collection of unique unsigned integer indices.
///
/// Indices are used to access collections like `Vec`, and an `IndexSet`
/// identifies a subset of the indices of such a collection. The set is stored
/// as a sorted list of disjoint [`Range`] runs, which makes it efficient when
/// members tend to form contiguous stretches; it is not a good fit for
/// arbitrary integer lists, and a given index can appear in a set only once.
///
/// A set built by one of the content constructors ([`IndexSet::empty`],
/// [`IndexSet::with_index`], [`IndexSet::with_indices`],
/// [`IndexSet::with_range`], [`IndexSet::with_set`]) is immutable on return.
/// To populate a set incrementally, start from [`IndexSet::new`], add members
/// with the `add_*` operations, and then call [`IndexSet::freeze`]. Any set
/// can be reinitialized through the `reinit*` operations, which discard its
/// contents and re-derive its mutability.
///
/// Stored runs maintain three invariants: they are sorted ascending by start,
/// every run is non-empty, and consecutive runs are separated by at least one
/// absent index (touching runs are coalesced on insertion).
///
/// The valid index domain is `0..u64::MAX`; `u64::MAX` itself is rejected, so
/// the exclusive upper bound of any run is always representable.
#[derive(Debug, Clone)]
pub struct IndexSet {
    /// Disjoint runs of member indices, sorted ascending by start.
    runs: Vec<Range>,
    /// Whether `add_*` and `remove_*` operations are currently allowed.
    mutable: bool,
}

impl IndexSet {
    /// Creates an empty, mutable set, to be populated with the `add_*`
    /// operations and then sealed with [`IndexSet::freeze`].
    pub fn new() -> IndexSet {
        IndexSet {
            runs: Vec::new(),
            mutable: true,
        }
    }

    /// Creates an empty, immutable set.
    pub fn empty() -> IndexSet {
        IndexSet {
            runs: Vec::new(),
            mutable: false,
        }
    }

    /// Creates an immutable set holding the single index `index`.
    pub fn with_index(index: u64) -> Result<IndexSet> {
        let mut set = IndexSet::new();
        set.reinit_with_index(index)?;
        Ok(set)
    }

    /// Creates an immutable set holding every index in `indices`.
    ///
    /// The slice does not need to be sorted, and duplicate indices collapse
    /// into a single membership.
    pub fn with_indices(indices: &[u64]) -> Result<IndexSet> {
        let mut set = IndexSet::new();
        set.reinit_with_indices(indices)?;
        Ok(set)
    }

    /// Creates an immutable set holding every index covered by `range`.
    pub fn with_range(range: Range) -> Result<IndexSet> {
        let mut set = IndexSet::new();
        set.reinit_with_range(range)?;
        Ok(set)
    }

    /// Creates an immutable deep copy of `source`.
    pub fn with_set(source: &IndexSet) -> IndexSet {
        let mut set = IndexSet::new();
        set.reinit_with_set(source);
        set
    }

    /// Creates an immutable set from ranges that are already sorted ascending
    /// by start. Touching or overlapping neighbors are coalesced; empty
    /// ranges are skipped. Out-of-order input is reported as an error.
    pub fn from_sorted_ranges<I>(ranges: I) -> Result<IndexSet>
    where
        I: IntoIterator<Item = Range>,
    {
        let mut pending = Vec::new();
        for range in ranges {
            verify_arg!(ranges, range.checked_end().is_some());
            if !range.is_empty() {
                pending.push(range);
            }
        }
        let runs = pending
            .into_iter()
            .coalesce(|prev, next| prev.coalesce(next))
            .collect::<Vec<_>>();
        let set = IndexSet {
            runs,
            mutable: false,
        };
        verify_arg!(ranges, set.runs_are_ordered());
        Ok(set)
    }

    /// Resets the set to empty and makes it mutable, reusing its allocation.
    pub fn reinit(&mut self) {
        self.runs.clear();
        self.mutable = true;
    }

    /// Resets the set to empty and makes it immutable.
    pub fn reinit_empty(&mut self) {
        self.reinit();
        self.freeze();
    }

    /// Resets the set to hold the single index `index`, and makes it
    /// immutable. On error the set is left unchanged.
    pub fn reinit_with_index(&mut self, index: u64) -> Result<()> {
        verify_arg!(index, index < u64::MAX);
        self.reinit();
        self.add_range_internal(Range::point(index));
        self.freeze();
        Ok(())
    }

    /// Resets the set to hold every index in `indices` (in any order, with
    /// duplicates collapsing), and makes it immutable. On error the set is
    /// left unchanged.
    pub fn reinit_with_indices(&mut self, indices: &[u64]) -> Result<()> {
        verify_arg!(indices, indices.iter().all(|&index| index < u64::MAX));
        self.reinit();
        for &index in indices {
            self.add_range_internal(Range::point(index));
        }
        self.freeze();
        Ok(())
    }

    /// Resets the set to hold every index covered by `range`, and makes it
    /// immutable. On error the set is left unchanged.
    pub fn reinit_with_range(&mut self, range: Range) -> Result<()> {
        verify_arg!(range, range.checked_end().is_some());
        self.reinit();
        self.add_range_internal(range);
        self.freeze();
        Ok(())
    }

    /// Resets the set to a deep copy of `source`, and makes it immutable.
    pub fn reinit_with_set(&mut self, source: &IndexSet) {
        self.reinit();
        for run in &source.runs {
            self.add_range_internal(*run);
        }
        self.freeze();
    }

    /// Seals the set against further mutation.
    #[inline]
    pub fn freeze(&mut self) {
        self.mutable = false;
    }

    /// Checks whether the `add_*` and `remove_*` operations are allowed.
    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Moves the set behind an atomically reference counted handle.
    pub fn into_shared(self) -> Shared<IndexSet> {
        Shared::new(self)
    }

    /// Returns the number of indices in the set.
    pub fn len(&self) -> u64 {
        self.runs.iter().map(|run| run.length).sum()
    }

    /// Checks whether the set holds no indices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Returns the number of stored runs.
    #[inline]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Returns the smallest index in the set, or `None` when it is empty.
    #[inline]
    pub fn first_index(&self) -> Option<u64> {
        self.runs.first().map(|run| run.start)
    }

    /// Returns the largest index in the set, or `None` when it is empty.
    #[inline]
    pub fn last_index(&self) -> Option<u64> {
        self.runs.last().map(|run| run.end() - 1)
    }

    /// Checks whether `index` is a member of the set.
    pub fn contains_index(&self, index: u64) -> bool {
        match self.runs.get(self.locate(index)) {
            Some(run) => run.contains(index),
            None => false,
        }
    }

    /// Checks whether a single stored run covers the whole of `range`.
    ///
    /// An empty range is trivially contained. Note that this is deliberately
    /// a single-run check, not a coverage check: a queried range that spans
    /// the gap between two runs is reported as not contained, even when every
    /// one of its indices is individually a member.
    pub fn contains_range(&self, range: Range) -> bool {
        if range.is_empty() {
            return true;
        }
        let Some(end) = range.checked_end() else {
            return false;
        };
        match self.runs.get(self.locate(range.start)) {
            Some(run) => run.contains(range.start) && run.contains(end - 1),
            None => false,
        }
    }

    /// Returns the member nearest to `index` under `predicate`, or `None`
    /// when no member qualifies.
    ///
    /// Walking [`Predicate::GreaterThan`] from [`IndexSet::first_index`] (or
    /// [`Predicate::LessThan`] from [`IndexSet::last_index`]) visits every
    /// member exactly once:
    ///
    /// ```
    /// use index_set::{IndexSet, Predicate};
    ///
    /// let set = IndexSet::with_indices(&[3, 4, 9])?;
    /// let mut cursor = set.first_index();
    /// while let Some(index) = cursor {
    ///     // use `index`
    ///     cursor = set.index_satisfying(Predicate::GreaterThan, index);
    /// }
    /// # Ok::<(), index_set::Error>(())
    /// ```
    pub fn index_satisfying(&self, predicate: Predicate, index: u64) -> Option<u64> {
        if self.runs.is_empty() {
            return None;
        }

        match predicate {
            Predicate::GreaterThan => {
                self.index_satisfying(Predicate::GreaterThanOrEqual, index.checked_add(1)?)
            }
            Predicate::GreaterThanOrEqual => {
                let run = self.runs.get(self.locate(index))?;
                if run.contains(index) {
                    Some(index)
                } else {
                    Some(run.start)
                }
            }
            Predicate::LessThan => {
                if index == 0 {
                    None
                } else {
                    self.index_satisfying(Predicate::LessThanOrEqual, index - 1)
                }
            }
            Predicate::LessThanOrEqual => {
                let pos = self.locate(index);
                if let Some(run) = self.runs.get(pos) {
                    if run.contains(index) {
                        return Some(index);
                    }
                }
                if pos == 0 {
                    None
                } else {
                    Some(self.runs[pos - 1].end() - 1)
                }
            }
        }
    }

    /// Adds `index` to a mutable set.
    pub fn add_index(&mut self, index: u64) -> Result<()> {
        self.ensure_mutable()?;
        verify_arg!(index, index < u64::MAX);
        self.add_range_internal(Range::point(index));
        Ok(())
    }

    /// Adds every index in `indices` to a mutable set.
    pub fn add_indices(&mut self, indices: &[u64]) -> Result<()> {
        self.ensure_mutable()?;
        verify_arg!(indices, indices.iter().all(|&index| index < u64::MAX));
        for &index in indices {
            self.add_range_internal(Range::point(index));
        }
        Ok(())
    }

    /// Adds every index covered by `range` to a mutable set.
    ///
    /// Runs that touch or overlap the added range are coalesced, so the run
    /// list stays the minimal sorted representation of the union.
    pub fn add_range(&mut self, range: Range) -> Result<()> {
        self.ensure_mutable()?;
        verify_arg!(range, range.checked_end().is_some());
        self.add_range_internal(range);
        Ok(())
    }

    /// Adds every index in `source` to a mutable set.
    pub fn add_set(&mut self, source: &IndexSet) -> Result<()> {
        self.ensure_mutable()?;
        for run in &source.runs {
            self.add_range_internal(*run);
        }
        Ok(())
    }

    /// Removes `index` from a mutable set.
    pub fn remove_index(&mut self, index: u64) -> Result<()> {
        self.ensure_mutable()?;
        verify_arg!(index, index < u64::MAX);
        self.remove_range_internal(Range::point(index));
        Ok(())
    }

    /// Removes every index in `indices` from a mutable set.
    pub fn remove_indices(&mut self, indices: &[u64]) -> Result<()> {
        self.ensure_mutable()?;
        verify_arg!(indices, indices.iter().all(|&index| index < u64::MAX));
        for &index in indices {
            self.remove_range_internal(Range::point(index));
        }
        Ok(())
    }

    /// Removes every index covered by `range` from a mutable set.
    ///
    /// Runs partially covered by the removed range are trimmed, and a run
    /// that strictly contains it is split in two.
    pub fn remove_range(&mut self, range: Range) -> Result<()> {
        self.ensure_mutable()?;
        verify_arg!(range, range.checked_end().is_some());
        self.remove_range_internal(range);
        Ok(())
    }

    /// Removes every index in `source` from a mutable set.
    pub fn remove_set(&mut self, source: &IndexSet) -> Result<()> {
        self.ensure_mutable()?;
        for run in &source.runs {
            self.remove_range_internal(*run);
        }
        Ok(())
    }

    /// Calls `visitor` on every member of the set, ascending, or descending
    /// with [`EnumerateFlags::REVERSE`]. The enumeration stops early the
    /// first time `visitor` returns `true`. No-op on an empty set.
    pub fn enumerate(&self, flags: EnumerateFlags, visitor: impl FnMut(u64) -> bool) {
        let (Some(first), Some(last)) = (self.first_index(), self.last_index()) else {
            return;
        };
        self.enumerate_in_range(Range::new(first, last - first + 1), flags, visitor);
    }

    /// Calls `visitor` on every member of the set that falls inside `range`,
    /// ascending, or descending with [`EnumerateFlags::REVERSE`]. The
    /// enumeration stops early the first time `visitor` returns `true`.
    /// No-op on an empty set or an empty range.
    ///
    /// The set is borrowed for the duration of the call, so it cannot be
    /// mutated from inside `visitor`.
    pub fn enumerate_in_range(
        &self,
        range: Range,
        flags: EnumerateFlags,
        mut visitor: impl FnMut(u64) -> bool,
    ) {
        trace!(
            "enumerating {} runs over {:?} ({:?})",
            self.run_count(),
            range,
            flags
        );
        if flags.contains(EnumerateFlags::REVERSE) {
            for index in self.indices_within(range).rev() {
                if visitor(index) {
                    return;
                }
            }
        } else {
            for index in self.indices_within(range) {
                if visitor(index) {
                    return;
                }
            }
        }
    }

    /// Returns an iterator over the stored runs, ascending.
    pub fn ranges(&self) -> std::iter::Copied<std::slice::Iter<'_, Range>> {
        self.runs.iter().copied()
    }

    /// Returns a double-ended iterator over every member of the set.
    pub fn indices(&self) -> IndicesIter<'_> {
        let clip = match (self.first_index(), self.last_index()) {
            (Some(first), Some(last)) => Range::new(first, last - first + 1),
            _ => Range::default(),
        };
        self.indices_within(clip)
    }

    /// Returns a double-ended iterator over every member of the set that
    /// falls inside `range`. Traversal walks the stored runs and clips only
    /// at the two boundary runs; it does not allocate.
    pub fn indices_within(&self, range: Range) -> IndicesIter<'_> {
        IndicesIter::new(self.clipped_runs(range).flatten())
    }

    /// Asserts the run list invariants: runs are sorted ascending, pairwise
    /// separated by at least one absent index, non-empty, and bounded.
    ///
    /// Panics on violation; intended for tests and debug builds.
    pub fn check_invariants(&self) {
        for run in &self.runs {
            assert!(!run.is_empty(), "empty run in {self}");
            assert!(
                run.checked_end().is_some(),
                "run past the index domain in {self}"
            );
        }
        assert!(self.runs_are_ordered(), "runs out of order in {self}");
    }

    /// Translates `index` into the position of the run that contains it, or
    /// of the run immediately after it; `self.runs.len()` when `index` is
    /// past every run.
    ///
    /// Binary search alone cannot bracket a point among variable-length
    /// half-open intervals, so it breaks out as soon as a candidate run
    /// could hold the index and a bounded linear pass then advances past
    /// runs ending at or before it.
    fn locate(&self, index: u64) -> usize {
        let mut lower = 0;
        let mut upper = self.runs.len();
        let mut pos = upper / 2;

        while upper != lower {
            let run = self.runs[pos];
            if index < run.start {
                upper = pos;
            } else if index > run.end() {
                lower = pos + 1;
            } else {
                break;
            }
            pos = (upper + lower) / 2;
        }

        // Skip runs holding only values smaller than the index.
        while pos < self.runs.len() && index >= self.runs[pos].end() {
            pos += 1;
        }

        pos
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.mutable {
            Ok(())
        } else {
            Err(Error::not_mutable())
        }
    }

    fn runs_are_ordered(&self) -> bool {
        self.runs
            .iter()
            .tuple_windows()
            .all(|(prev, next)| next.start > prev.end())
    }

    #[inline]
    fn debug_check(&self) {
        #[cfg(debug_assertions)]
        self.check_invariants();
    }

    /// Inserts `range` and restores the invariants by coalescing the runs it
    /// touches or overlaps, below and above.
    fn add_range_internal(&mut self, range: Range) {
        if range.is_empty() {
            return;
        }

        let mut pos = self.locate(range.start);
        if pos >= self.runs.len() {
            self.runs.push(range);
        } else {
            if self.runs[pos].contains(range.start) {
                // The containing run absorbs the lower overlap below.
                pos += 1;
            }
            self.runs.insert(pos, range);
        }

        // Coalesce the preceding runs: a predecessor reaching the inserted
        // start keeps its own start, grows up to the inserted end if needed,
        // and takes the inserted run's place.
        while pos > 0 {
            let prev = self.runs[pos - 1];
            if prev.end() < range.start {
                break;
            }
            if prev.end() < range.end() {
                self.runs[pos - 1].length += range.end() - prev.end();
            }
            self.runs.remove(pos);
            pos -= 1;
        }

        // Coalesce the following runs into the run now at `pos`.
        while pos + 1 < self.runs.len() {
            let next = self.runs[pos + 1];
            if range.end() < next.start {
                break;
            }
            self.runs.remove(pos + 1);
            if next.end() > range.end() {
                self.runs[pos].length += next.end() - range.end();
            }
        }

        self.debug_check();
        trace!("added {:?}: {}", range, self);
    }

    /// Removes the members covered by `range`, trimming, deleting, or
    /// splitting the runs it overlaps.
    fn remove_range_internal(&mut self, range: Range) {
        if range.is_empty() {
            return;
        }

        let start = range.start;
        let end = range.end();
        let mut pos = self.locate(start);

        while pos < self.runs.len() {
            let run = self.runs[pos];
            if run.start >= end {
                break;
            }
            if run.start < start && run.end() > end {
                // The removed span lies strictly inside one run: split it.
                self.runs[pos].length = start - run.start;
                self.runs.insert(pos + 1, Range::new(end, run.end() - end));
                break;
            } else if run.start < start {
                // Keep the head of the run, drop its tail.
                self.runs[pos].length = start - run.start;
                pos += 1;
            } else if run.end() > end {
                // Keep the tail of the run, drop its head.
                self.runs[pos] = Range::new(end, run.end() - end);
                break;
            } else {
                // The run is wholly covered.
                self.runs.remove(pos);
            }
        }

        self.debug_check();
        trace!("removed {:?}: {}", range, self);
    }

    /// Computes the window of runs overlapping `range` and wraps it in an
    /// iterator clipping the two boundary runs. Interior runs need no
    /// clipping: they lie entirely between the located endpoints.
    fn clipped_runs(&self, range: Range) -> ClippedRunsIter<'_> {
        if range.is_empty() || self.runs.is_empty() {
            return ClippedRunsIter::empty();
        }

        let clip_start = range.start;
        let clip_end = range.start.saturating_add(range.length);

        let lower = self.locate(clip_start);
        let pos = self.locate(clip_end - 1);
        let upper = if pos < self.runs.len() && self.runs[pos].start < clip_end {
            pos + 1
        } else {
            pos
        };
        if upper <= lower {
            return ClippedRunsIter::empty();
        }

        ClippedRunsIter::new(self.runs[lower..upper].iter(), clip_start, clip_end)
    }
}

impl Default for IndexSet {
    fn default() -> IndexSet {
        IndexSet::new()
    }
}

/// Two sets are equal when they hold the same members; mutability does not
/// take part in the comparison.
impl PartialEq for IndexSet {
    fn eq(&self, other: &IndexSet) -> bool {
        self.runs == other.runs
    }
}

impl Eq for IndexSet {}

impl fmt::Display for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.runs.is_empty() {
            return write!(f, "[ empty ]");
        }
        write!(
            f,
            "[ number of indices {} (in {} runs), indices:",
            self.len(),
            self.run_count()
        )?;
        for run in &self.runs {
            if run.length == 1 {
                write!(f, " {}", run.start)?;
            } else {
                write!(f, " ({} - {})", run.start, run.length)?;
            }
        }
        write!(f, " ]")
    }
}

/// Iterator over the runs of an [`IndexSet`] that overlap a query range,
/// clipped to that range at the boundary runs.
#[derive(Clone)]
pub struct ClippedRunsIter<'a> {
    runs: std::slice::Iter<'a, Range>,
    clip_start: u64,
    clip_end: u64,
}

impl<'a> ClippedRunsIter<'a> {
    #[inline]
    fn empty() -> ClippedRunsIter<'a> {
        ClippedRunsIter {
            runs: [].iter(),
            clip_start: 0,
            clip_end: 0,
        }
    }

    #[inline]
    fn new(runs: std::slice::Iter<'a, Range>, clip_start: u64, clip_end: u64) -> ClippedRunsIter<'a> {
        ClippedRunsIter {
            runs,
            clip_start,
            clip_end,
        }
    }

    #[inline]
    fn clip_run(&self, run: Range) -> std::ops::Range<u64> {
        let clipped = run.start.max(self.clip_start)..run.end().min(self.clip_end);
        debug_assert!(clipped.start < clipped.end);
        clipped
    }
}

impl<'a> Iterator for ClippedRunsIter<'a> {
    type Item = std::ops::Range<u64>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.runs.next().map(|&run| self.clip_run(run))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.runs.size_hint()
    }
}

impl<'a> DoubleEndedIterator for ClippedRunsIter<'a> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.runs.next_back().map(|&run| self.clip_run(run))
    }
}

impl<'a> ExactSizeIterator for ClippedRunsIter<'a> {}

impl<'a> std::iter::FusedIterator for ClippedRunsIter<'a> {}

/// Double-ended iterator over the members of an [`IndexSet`], implemented by
/// flattening [`ClippedRunsIter`].
#[derive(Clone)]
pub struct IndicesIter<'a>(std::iter::Flatten<ClippedRunsIter<'a>>);

impl<'a> IndicesIter<'a> {
    #[inline]
    fn new(inner: std::iter::Flatten<ClippedRunsIter<'a>>) -> IndicesIter<'a> {
        IndicesIter(inner)
    }
}

impl<'a> Iterator for IndicesIter<'a> {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> DoubleEndedIterator for IndicesIter<'a> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }
}

impl<'a> std::iter::FusedIterator for IndicesIter<'a> {}
