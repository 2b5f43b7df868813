use crate::index_set::{EnumerateFlags, IndexSet};
use crate::range::Range;

fn collect(set: &IndexSet, range: Range, flags: EnumerateFlags) -> Vec<u64> {
    let mut visited = Vec::new();
    set.enumerate_in_range(range, flags, |index| {
        visited.push(index);
        false
    });
    visited
}

#[test]
fn test_enumerate_forward_and_backward() {
    let set = IndexSet::with_range(Range::new(0, 10)).unwrap();

    let mut visited = Vec::new();
    set.enumerate(EnumerateFlags::empty(), |index| {
        visited.push(index);
        false
    });
    assert_eq!(visited, (0..10).collect::<Vec<_>>());

    let mut visited = Vec::new();
    set.enumerate(EnumerateFlags::REVERSE, |index| {
        visited.push(index);
        false
    });
    assert_eq!(visited, (0..10).rev().collect::<Vec<_>>());
}

#[test]
fn test_enumerate_early_stop() {
    let set = IndexSet::with_range(Range::new(0, 10)).unwrap();

    let mut visited = Vec::new();
    set.enumerate(EnumerateFlags::empty(), |index| {
        visited.push(index);
        index == 5
    });
    assert_eq!(visited, vec![0, 1, 2, 3, 4, 5]);

    let mut visited = Vec::new();
    set.enumerate(EnumerateFlags::REVERSE, |index| {
        visited.push(index);
        index == 5
    });
    assert_eq!(visited, vec![9, 8, 7, 6, 5]);
}

#[test]
fn test_enumerate_in_range_clips_boundary_runs() {
    let set =
        IndexSet::from_sorted_ranges([Range::new(0, 5), Range::new(10, 5), Range::new(20, 5)])
            .unwrap();

    // The query range cuts into the first and last overlapping runs; the
    // interior run is visited whole.
    let forward = collect(&set, Range::new(3, 19), EnumerateFlags::empty());
    assert_eq!(forward, vec![3, 4, 10, 11, 12, 13, 14, 20, 21]);

    let backward = collect(&set, Range::new(3, 19), EnumerateFlags::REVERSE);
    assert_eq!(backward, vec![21, 20, 14, 13, 12, 11, 10, 4, 3]);

    // A query falling inside a gap visits nothing.
    assert!(collect(&set, Range::new(5, 5), EnumerateFlags::empty()).is_empty());

    // A query past every run visits nothing.
    assert!(collect(&set, Range::new(40, 10), EnumerateFlags::empty()).is_empty());

    // A query covering a single interior run.
    let interior = collect(&set, Range::new(10, 5), EnumerateFlags::empty());
    assert_eq!(interior, vec![10, 11, 12, 13, 14]);
}

#[test]
fn test_enumerate_no_ops() {
    let empty = IndexSet::empty();
    empty.enumerate(EnumerateFlags::empty(), |_| panic!("visited an empty set"));

    let set = IndexSet::with_range(Range::new(0, 10)).unwrap();
    set.enumerate_in_range(Range::new(3, 0), EnumerateFlags::empty(), |_| {
        panic!("visited an empty range")
    });
}

#[test]
fn test_indices_iterators() {
    let set = IndexSet::with_indices(&[0, 1, 2, 8, 9]).unwrap();

    assert_eq!(set.indices().collect::<Vec<_>>(), vec![0, 1, 2, 8, 9]);
    assert_eq!(
        set.indices().rev().collect::<Vec<_>>(),
        vec![9, 8, 2, 1, 0]
    );

    assert_eq!(
        set.indices_within(Range::new(1, 8)).collect::<Vec<_>>(),
        vec![1, 2, 8]
    );

    // Double-ended traversal meets in the middle.
    let mut iter = set.indices();
    assert_eq!(iter.next(), Some(0));
    assert_eq!(iter.next_back(), Some(9));
    assert_eq!(iter.next(), Some(1));
    assert_eq!(iter.next_back(), Some(8));
    assert_eq!(iter.next(), Some(2));
    assert_eq!(iter.next(), None);

    assert!(IndexSet::empty().indices().next().is_none());
}

#[test]
fn test_ranges_iterator() {
    let set = IndexSet::with_indices(&[0, 1, 5, 6, 7]).unwrap();
    let runs: Vec<Range> = set.ranges().collect();
    assert_eq!(runs, vec![Range::new(0, 2), Range::new(5, 3)]);
}
