use crate::range::Range;

#[test]
fn test_bounds() {
    let r = Range::new(10, 5);
    assert_eq!(r.len(), 5);
    assert!(!r.is_empty());
    assert_eq!(r.end(), 15);
    assert_eq!(r.checked_end(), Some(15));
    assert_eq!(r.last(), Some(14));
    assert_eq!(r.center(), 12);

    let empty = Range::new(10, 0);
    assert!(empty.is_empty());
    assert_eq!(empty.end(), 10);
    assert_eq!(empty.last(), None);
    assert_eq!(empty.center(), 10);

    let top = Range::new(u64::MAX - 1, 1);
    assert_eq!(top.checked_end(), Some(u64::MAX));
    assert_eq!(Range { start: u64::MAX, length: 1 }.checked_end(), None);
}

#[test]
fn test_contains() {
    let r = Range::new(10, 5);
    assert!(!r.contains(9));
    assert!(r.contains(10));
    assert!(r.contains(14));
    assert!(!r.contains(15));

    assert!(!Range::new(10, 0).contains(10));

    let point = Range::point(7);
    assert_eq!(point.len(), 1);
    assert!(point.contains(7));
    assert!(!point.contains(8));
}

#[test]
fn test_union() {
    let a = Range::new(0, 10);
    let b = Range::new(5, 10);
    assert_eq!(a.union(b), Range::new(0, 15));
    assert_eq!(b.union(a), Range::new(0, 15));

    // Disjoint ranges still produce the covering interval.
    let c = Range::new(20, 5);
    assert_eq!(a.union(c), Range::new(0, 25));

    assert_eq!(a.union(a), a);
}

#[test]
fn test_intersection() {
    let a = Range::new(0, 10);
    let b = Range::new(5, 10);
    assert_eq!(a.intersection(b), Some(Range::new(5, 5)));
    assert_eq!(b.intersection(a), Some(Range::new(5, 5)));

    // Touching is not overlapping.
    assert_eq!(a.intersection(Range::new(10, 5)), None);
    assert_eq!(a.intersection(Range::new(50, 5)), None);
    assert_eq!(a.intersection(Range::new(3, 0)), None);

    assert_eq!(a.intersection(a), Some(a));
}

#[test]
fn test_coalesce() {
    let a = Range::new(0, 5);

    // Adjacent and overlapping successors merge.
    assert_eq!(a.coalesce(Range::new(5, 5)), Ok(Range::new(0, 10)));
    assert_eq!(a.coalesce(Range::new(3, 10)), Ok(Range::new(0, 13)));
    assert_eq!(a.coalesce(Range::new(2, 1)), Ok(a));

    // Gapped or out-of-order pairs are handed back.
    assert_eq!(
        a.coalesce(Range::new(6, 2)),
        Err((a, Range::new(6, 2)))
    );

    let early = Range::new(0, 1);
    let late = Range::new(10, 5);
    assert_eq!(late.coalesce(early), Err((late, early)));
}

#[test]
fn test_std_range_conversions() {
    let r = Range::from(3u64..9);
    assert_eq!(r, Range::new(3, 6));
    assert_eq!(std::ops::Range::<u64>::from(r), 3..9);

    let empty = Range::from(5u64..5);
    assert!(empty.is_empty());
}
