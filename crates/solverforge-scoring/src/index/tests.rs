use super::*;

fn t(i: u32) -> TupleId {
    TupleId::new(i, 0)
}

#[test]
fn test_keys_compare_by_value_and_type() {
    assert_eq!(IndexKey::single(3u32), IndexKey::single(3u32));
    assert_ne!(IndexKey::single(3u32), IndexKey::single(4u32));
    assert_ne!(IndexKey::single(3u32), IndexKey::single(3u64));
    assert_ne!(IndexKey::single(3u32), IndexKey::empty());
}

#[test]
fn test_composite_key() {
    let parts = |a: u32, b: &'static str| {
        IndexKey::from_parts([
            std::sync::Arc::new(a) as std::sync::Arc<dyn DynKey>,
            std::sync::Arc::new(b) as std::sync::Arc<dyn DynKey>,
        ])
    };
    assert_eq!(parts(1, "x"), parts(1, "x"));
    assert_ne!(parts(1, "x"), parts(1, "y"));
    assert_eq!(parts(1, "x").len(), 2);
}

#[test]
fn test_equals_indexer_buckets() {
    let mut index = EqualsIndexer::default();
    let red = IndexKey::single("red");
    let blue = IndexKey::single("blue");

    index.put(&red, t(1)).unwrap();
    index.put(&red, t(2)).unwrap();
    index.put(&blue, t(3)).unwrap();

    assert_eq!(index.matches(&red), vec![t(1), t(2)]);
    assert_eq!(index.matches(&blue), vec![t(3)]);
    assert!(index.matches(&IndexKey::single("green")).is_empty());

    index.remove(&red, t(1)).unwrap();
    assert_eq!(index.matches(&red), vec![t(2)]);
}

#[test]
fn test_equals_indexer_remove_absent_is_corruption() {
    let mut index = EqualsIndexer::default();
    let key = IndexKey::single(1i32);
    index.put(&key, t(1)).unwrap();

    let err = index.remove(&key, t(2)).unwrap_err();
    assert!(err.is_corruption());
    let err = index.remove(&IndexKey::single(2i32), t(1)).unwrap_err();
    assert!(err.is_corruption());
}

#[test]
fn test_none_indexer_ignores_key() {
    let mut index = NoneIndexer::default();
    index.put(&IndexKey::empty(), t(1)).unwrap();
    index.put(&IndexKey::empty(), t(2)).unwrap();

    assert_eq!(index.matches(&IndexKey::single(99u8)), vec![t(1), t(2)]);
    index.remove(&IndexKey::empty(), t(1)).unwrap();
    assert!(index.remove(&IndexKey::empty(), t(1)).unwrap_err().is_corruption());
}

#[test]
fn test_indexer_choice() {
    let mut unindexed = indexer_for(0, None);
    unindexed.put(&IndexKey::single(1u8), t(7)).unwrap();
    assert_eq!(unindexed.matches(&IndexKey::single(2u8)), vec![t(7)]);

    let mut indexed = indexer_for(1, None);
    indexed.put(&IndexKey::single(1u8), t(7)).unwrap();
    assert!(indexed.matches(&IndexKey::single(2u8)).is_empty());

    let mut ordered = indexer_for(0, Some(Comparison::GreaterThan));
    ordered.put(&IndexKey::empty().with_range(std::sync::Arc::new(3u8)), t(7)).unwrap();
    assert_eq!(ordered.matches(&IndexKey::empty().with_range(std::sync::Arc::new(2u8))), vec![t(7)]);
    assert!(ordered.matches(&IndexKey::empty().with_range(std::sync::Arc::new(3u8))).is_empty());
}

fn ranged(group: &'static str, value: i64) -> IndexKey {
    IndexKey::single(group).with_range(std::sync::Arc::new(value))
}

#[test]
fn test_comparison_indexer_walks_one_side_of_the_query() {
    // stored values below the queried one
    let mut index = ComparisonIndexer::new(Comparison::LessThan);
    index.put(&ranged("a", 5), t(1)).unwrap();
    index.put(&ranged("a", 1), t(2)).unwrap();
    index.put(&ranged("a", 3), t(3)).unwrap();
    index.put(&ranged("b", 0), t(4)).unwrap();

    assert_eq!(index.matches(&ranged("a", 5)), vec![t(2), t(3)]);
    assert_eq!(index.matches(&ranged("a", 6)), vec![t(2), t(3), t(1)]);
    assert!(index.matches(&ranged("a", 1)).is_empty());
    assert_eq!(index.matches(&ranged("b", 9)), vec![t(4)]);

    index.remove(&ranged("a", 3), t(3)).unwrap();
    assert_eq!(index.matches(&ranged("a", 6)), vec![t(2), t(1)]);
}

#[test]
fn test_comparison_bounds_include_equal_values_when_asked() {
    let mut le = ComparisonIndexer::new(Comparison::LessThanOrEqual);
    let mut ge = ComparisonIndexer::new(Comparison::GreaterThanOrEqual);
    let mut gt = ComparisonIndexer::new(Comparison::GreaterThan);
    for (i, v) in [2i64, 4, 6].into_iter().enumerate() {
        le.put(&ranged("a", v), t(i as u32)).unwrap();
        ge.put(&ranged("a", v), t(i as u32)).unwrap();
        gt.put(&ranged("a", v), t(i as u32)).unwrap();
    }
    assert_eq!(le.matches(&ranged("a", 4)), vec![t(0), t(1)]);
    assert_eq!(ge.matches(&ranged("a", 4)), vec![t(1), t(2)]);
    assert_eq!(gt.matches(&ranged("a", 4)), vec![t(2)]);
}

#[test]
fn test_comparison_indexer_requires_a_range() {
    let mut index = ComparisonIndexer::new(Comparison::GreaterThan);
    assert!(index.put(&IndexKey::single("a"), t(1)).unwrap_err().is_corruption());
    index.put(&ranged("a", 1), t(1)).unwrap();
    assert!(index.remove(&ranged("a", 2), t(1)).unwrap_err().is_corruption());
    assert!(index.matches(&IndexKey::single("a")).is_empty());
}

#[test]
fn test_comparison_flip_and_holds() {
    use std::cmp::Ordering;
    assert_eq!(Comparison::LessThan.flip(), Comparison::GreaterThan);
    assert_eq!(Comparison::GreaterThanOrEqual.flip(), Comparison::LessThanOrEqual);
    assert!(Comparison::LessThanOrEqual.holds(Ordering::Equal));
    assert!(!Comparison::LessThan.holds(Ordering::Equal));
    assert!(Comparison::GreaterThan.holds(Ordering::Greater));
}

#[test]
fn test_ranged_keys_differ_by_range() {
    assert_eq!(ranged("a", 1), ranged("a", 1));
    assert_ne!(ranged("a", 1), ranged("a", 2));
    assert_ne!(ranged("a", 1), IndexKey::single("a"));
    assert_eq!(ranged("a", 1).prefix(), IndexKey::single("a"));
}
