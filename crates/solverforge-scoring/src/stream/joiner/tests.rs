use super::*;
use crate::fact::FactRef;
use crate::index::IndexKey;
use crate::node::compute_key;

#[derive(Debug)]
struct Shift {
    employee: u32,
    start: i64,
    end: i64,
}

#[derive(Debug)]
struct Employee {
    id: u32,
}

fn shift(employee: u32, start: i64, end: i64) -> Vec<FactRef> {
    vec![FactRef::new(Shift {
        employee,
        start,
        end,
    })]
}

fn lower<L, X, J: Joiner<L, X>>(joiner: J) -> JoinerDef {
    joiner.lower()
}

fn keys(ops: &[Operand<KeyFn>], facts: &[FactRef]) -> IndexKey {
    let keys: Vec<KeyFn> = ops.iter().map(|op| op.f.clone()).collect();
    compute_key(&keys, Facts::new(facts))
}

fn accepts(def: &JoinerDef, left: &[FactRef], right: &[FactRef]) -> bool {
    let (l, r) = (Facts::new(left), Facts::new(right));
    def.range.as_ref().map_or(true, |range| range.holds(l, r)) && def.filters.iter().all(|op| (op.f)(l, r))
}

#[test]
fn test_equal_bi_lowers_to_keys() {
    let def = lower::<(Shift,), Employee, _>(equal_bi(|s: &Shift| s.employee, |e: &Employee| e.id));
    assert_eq!(def.left_keys.len(), 1);
    assert_eq!(def.right_keys.len(), 1);
    assert!(def.filters.is_empty());

    let s = shift(7, 0, 8);
    let e = vec![FactRef::new(Employee { id: 7 })];
    let other = vec![FactRef::new(Employee { id: 8 })];
    assert_eq!(keys(&def.left_keys, &s), keys(&def.right_keys, &e));
    assert_ne!(keys(&def.left_keys, &s), keys(&def.right_keys, &other));
}

#[test]
fn test_equal_on_bi_left_reads_both_facts() {
    let def = lower::<(Shift, Employee), Shift, _>(equal_bi(
        |_: &Shift, e: &Employee| e.id,
        |s: &Shift| s.employee,
    ));
    let left = vec![
        FactRef::new(Shift {
            employee: 1,
            start: 0,
            end: 1,
        }),
        FactRef::new(Employee { id: 3 }),
    ];
    assert_eq!(keys(&def.left_keys, &left), keys(&def.right_keys, &shift(3, 0, 1)));
}

#[test]
fn test_comparisons_lower_to_a_range() {
    let lt = lower::<(Shift,), Shift, _>(less_than(|a: &Shift| a.end, |b: &Shift| b.start));
    assert!(accepts(&lt, &shift(1, 0, 8), &shift(1, 9, 12)));
    assert!(!accepts(&lt, &shift(1, 0, 8), &shift(1, 8, 12)));

    let le = lower::<(Shift,), Shift, _>(less_than_or_equal(|a: &Shift| a.end, |b: &Shift| b.start));
    assert!(accepts(&le, &shift(1, 0, 8), &shift(1, 8, 12)));

    let gt = lower::<(Shift,), Shift, _>(greater_than(|a: &Shift| a.start, |b: &Shift| b.start));
    assert!(accepts(&gt, &shift(1, 5, 8), &shift(1, 4, 12)));
    assert!(!accepts(&gt, &shift(1, 4, 8), &shift(1, 4, 12)));

    let ge = lower::<(Shift,), Shift, _>(greater_than_or_equal(|a: &Shift| a.start, |b: &Shift| b.start));
    assert!(accepts(&ge, &shift(1, 4, 8), &shift(1, 4, 12)));
    assert!(ge.filters.is_empty());
    assert!(matches!(ge.range.as_ref().map(|r| r.op), Some(Comparison::GreaterThanOrEqual)));
}

#[test]
fn test_overlap_is_a_filter() {
    let overlap = lower::<(Shift,), Shift, _>(overlapping(
        |a: &Shift| a.start,
        |a: &Shift| a.end,
        |b: &Shift| b.start,
        |b: &Shift| b.end,
    ));
    assert!(accepts(&overlap, &shift(1, 0, 10), &shift(1, 5, 15)));
    assert!(!accepts(&overlap, &shift(1, 0, 10), &shift(1, 10, 20)));
    assert!(overlap.range.is_none());
}

#[test]
fn test_and_concatenates_keys_and_filters() {
    let joiner = equal(|s: &Shift| s.employee)
        .and(filtering(|a: &Shift, b: &Shift| a.start != b.start))
        .and(equal(|s: &Shift| s.end));
    let def = lower::<(Shift,), Shift, _>(joiner);
    assert_eq!(def.left_keys.len(), 2);
    assert_eq!(def.right_keys.len(), 2);
    assert_eq!(def.filters.len(), 1);
    assert!(accepts(&def, &shift(1, 0, 8), &shift(1, 2, 8)));
    assert!(!accepts(&def, &shift(1, 2, 8), &shift(1, 2, 8)));
}

#[test]
fn test_cross_is_empty() {
    let def = lower::<(Shift,), Employee, _>(cross());
    assert!(def.left_keys.is_empty() && def.right_keys.is_empty() && def.filters.is_empty());
}

fn by_employee(s: &Shift) -> u32 {
    s.employee
}

#[test]
fn test_identity_stable_for_fn_items() {
    let a = lower::<(Shift,), Shift, _>(equal(by_employee));
    let b = lower::<(Shift,), Shift, _>(equal(by_employee));
    assert_eq!(a.identity(), b.identity());

    let c = lower::<(Shift,), Shift, _>(equal(|s: &Shift| s.employee));
    assert_ne!(a.identity(), c.identity());
}

#[test]
fn test_second_comparison_becomes_a_filter() {
    let joiner = less_than(|a: &Shift| a.start, |b: &Shift| b.start)
        .and(equal(|s: &Shift| s.employee))
        .and(greater_than(|a: &Shift| a.end, |b: &Shift| b.start));
    let def = lower::<(Shift,), Shift, _>(joiner);
    assert!(matches!(def.range.as_ref().map(|r| r.op), Some(Comparison::LessThan)));
    assert_eq!(def.left_keys.len(), 1);
    assert_eq!(def.filters.len(), 1);

    // start 0 < 4, end 8 > 4
    assert!(accepts(&def, &shift(1, 0, 8), &shift(1, 4, 12)));
    // end 3 > 4 fails in the demoted filter
    assert!(!accepts(&def, &shift(1, 0, 3), &shift(1, 4, 12)));
    assert!(!accepts(&def, &shift(1, 5, 8), &shift(1, 4, 12)));
}
