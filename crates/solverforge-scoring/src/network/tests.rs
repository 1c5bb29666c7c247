use solverforge_core::{HardSoftScore, SimpleScore};

use super::*;
use crate::api::ConstraintWeightOverrides;
use crate::stream::joiner::{equal, equal_bi, less_than};
use crate::stream::ConstraintFactory;

#[derive(Debug)]
struct Shift {
    employee: u32,
    start: i64,
}

#[derive(Debug)]
struct Employee {
    id: u32,
}

fn is_early(s: &Shift) -> bool {
    s.start < 8
}

#[test]
fn test_one_source_per_fact_type() {
    let f = ConstraintFactory::new();
    let network = CompiledNetwork::build([
        f.for_each::<Shift>().penalize(SimpleScore::ONE).as_constraint("a"),
        f.for_each::<Shift>().reward(SimpleScore::ONE).as_constraint("b"),
        f.for_each::<Employee>().penalize(SimpleScore::ONE).as_constraint("c"),
    ])
    .unwrap();

    assert_eq!(network.source_count(), 2);
    assert_eq!(network.node_count(), 5);
    assert!(network.shares_node("a", "b"));
    assert!(!network.shares_node("a", "c"));
    assert_eq!(network.source_of::<Shift>(), network.scorer_parent("a"));
}

#[test]
fn test_identical_filters_shared() {
    let f = ConstraintFactory::new();
    let network = CompiledNetwork::build([
        f.for_each::<Shift>().filter(is_early).penalize(SimpleScore::ONE).as_constraint("a"),
        f.for_each::<Shift>().filter(is_early).penalize(SimpleScore::of(2)).as_constraint("b"),
    ])
    .unwrap();

    assert_eq!(network.shared_node_hits(), 1);
    assert_eq!(network.node_count(), 4);
    assert!(network.shares_node("a", "b"));
    let filter = network.scorer_parent("a").unwrap();
    assert_eq!(network.node_label(filter), Some("filter"));
}

#[test]
fn test_capturing_closures_shared_only_by_instance() {
    let f = ConstraintFactory::new();
    let threshold = 8;
    let early = f.for_each::<Shift>().filter(move |s: &Shift| s.start < threshold);
    let a = early.clone().penalize(SimpleScore::ONE).as_constraint("a");
    let b = early.penalize(SimpleScore::ONE).as_constraint("b");
    let c = f
        .for_each::<Shift>()
        .filter(move |s: &Shift| s.start < threshold)
        .penalize(SimpleScore::ONE)
        .as_constraint("c");

    let network = CompiledNetwork::build([a, b, c]).unwrap();
    assert!(network.shares_node("a", "b"));
    assert!(!network.shares_node("a", "c"));
}

#[test]
fn test_joins_with_same_joiner_shared() {
    let f = ConstraintFactory::new();
    let left = |s: &Shift| s.employee;
    let right = |e: &Employee| e.id;
    let network = CompiledNetwork::build([
        f.for_each::<Shift>()
            .join(f.for_each::<Employee>(), equal_bi(left, right))
            .penalize(SimpleScore::ONE)
            .as_constraint("a"),
        f.for_each::<Shift>()
            .join(f.for_each::<Employee>(), equal_bi(left, right))
            .reward(SimpleScore::ONE)
            .as_constraint("b"),
    ])
    .unwrap();

    assert!(network.shares_node("a", "b"));
    let join = network.scorer_parent("a").unwrap();
    assert_eq!(network.node_label(join), Some("join"));
    assert_eq!(network.parents(join).len(), 2);
}

#[test]
fn test_duplicate_constraint_rejected() {
    let f = ConstraintFactory::with_package("rostering");
    let result = CompiledNetwork::build([
        f.for_each::<Shift>().penalize(SimpleScore::ONE).as_constraint("dup"),
        f.for_each::<Employee>().penalize(SimpleScore::ONE).as_constraint("dup"),
    ]);
    match result {
        Err(ScoringError::DuplicateConstraint(name)) => assert_eq!(name, "rostering/dup"),
        other => panic!("expected duplicate error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_zero_weight_culled() {
    let f = ConstraintFactory::new();
    let network = CompiledNetwork::build([
        f.for_each::<Shift>().filter(is_early).penalize(SimpleScore::ZERO).as_constraint("off"),
        f.for_each::<Employee>().penalize(SimpleScore::ONE).as_constraint("on"),
    ])
    .unwrap();

    assert_eq!(network.node_count(), 2);
    assert_eq!(network.source_of::<Shift>(), None);
    assert_eq!(network.culled_constraints().len(), 1);
    assert_eq!(network.culled_constraints()[0].name, "off");
    let names: Vec<_> = network.constraint_refs().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["on"]);
}

#[test]
fn test_weight_overrides_by_full_or_bare_name() {
    let f = ConstraintFactory::with_package("rostering");
    let mut overrides = ConstraintWeightOverrides::new();
    overrides.put("rostering/early", HardSoftScore::ZERO);
    overrides.put("late", HardSoftScore::of_soft(7));

    let network = CompiledNetwork::build_with_weights(
        [
            f.for_each::<Shift>().filter(is_early).penalize(HardSoftScore::ONE_HARD).as_constraint("early"),
            f.for_each::<Shift>().penalize(HardSoftScore::ONE_SOFT).as_constraint("late"),
        ],
        &overrides,
    )
    .unwrap();

    assert_eq!(network.culled_constraints().len(), 1);
    assert_eq!(network.constraint_weight("late"), Some(HardSoftScore::of_soft(7)));
    assert_eq!(network.constraint_weight("rostering/late"), Some(HardSoftScore::of_soft(7)));
    assert_eq!(network.constraint_weight("early"), None);
}

#[test]
fn test_layers_and_parent_order() {
    let f = ConstraintFactory::new();
    let network = CompiledNetwork::build([f
        .for_each::<Shift>()
        .filter(is_early)
        .join(f.for_each::<Employee>(), equal_bi(|s: &Shift| s.employee, |e: &Employee| e.id))
        .penalize(SimpleScore::ONE)
        .as_constraint("early")])
    .unwrap();

    // source, filter, source, join, scorer
    assert_eq!(network.node_count(), 5);
    assert_eq!(network.layer_count(), 4);
    for id in 0..network.node_count() {
        for &parent in network.parents(id) {
            assert!(parent < id);
            assert!(network.layer_of(parent).unwrap() < network.layer_of(id).unwrap());
        }
    }
    let join = network.scorer_parent("early").unwrap();
    assert_eq!(network.layer_of(join), Some(2));
}

#[test]
fn test_forwarders_reserve_on_producer() {
    let f = ConstraintFactory::new();
    let network = CompiledNetwork::build([f
        .for_each::<Shift>()
        .filter(is_early)
        .filter(|s: &Shift| s.employee > 0)
        .penalize(SimpleScore::ONE)
        .as_constraint("c")])
    .unwrap();

    let source = network.source_of::<Shift>().unwrap();
    // two filter flags and the scorer's undo slot, all on source tuples
    assert_eq!(network.store_sizes[source], 3);
    assert!(network.store_sizes[source + 1..].iter().all(|&size| size == 0));
}

#[test]
fn test_self_join_sides_get_disjoint_slots() {
    let f = ConstraintFactory::new();
    let network = CompiledNetwork::build([f
        .for_each_unique_pair(|s: &Shift| s.start, equal(|s: &Shift| s.employee))
        .penalize(SimpleScore::ONE)
        .as_constraint("pair")])
    .unwrap();

    let source = network.source_of::<Shift>().unwrap();
    let join = network.scorer_parent("pair").unwrap();
    assert_eq!(network.parents(join), &[source, source]);
    assert_eq!(network.store_sizes[source], 4);
    assert_eq!(network.store_sizes[join], 1);
    assert_eq!(network.children()[source].len(), 2);
}

#[test]
fn test_concat_reserves_one_slot_per_side() {
    let f = ConstraintFactory::new();
    let all = f.for_each::<Shift>();
    let network = CompiledNetwork::build([all
        .clone()
        .concat(all)
        .penalize(SimpleScore::ONE)
        .as_constraint("twice")])
    .unwrap();

    let source = network.source_of::<Shift>().unwrap();
    let concat = network.scorer_parent("twice").unwrap();
    assert_eq!(network.node_label(concat), Some("concat"));
    assert_eq!(network.parents(concat), &[source, source]);
    assert_eq!(network.store_sizes[source], 2);
    assert_eq!(network.store_sizes[concat], 1);
}

#[test]
fn test_exists_reserves_forwarded_flag() {
    let f = ConstraintFactory::new();
    let network = CompiledNetwork::build([f
        .for_each::<Shift>()
        .if_not_exists(f.for_each::<Shift>(), less_than(|s: &Shift| s.start, |o: &Shift| o.start))
        .penalize(SimpleScore::ONE)
        .as_constraint("first")])
    .unwrap();

    let source = network.source_of::<Shift>().unwrap();
    let exists = network.scorer_parent("first").unwrap();
    assert_eq!(network.node_label(exists), Some("if_not_exists"));
    // left 3, right 2, scorer 1 through the forwarder
    assert_eq!(network.store_sizes[source], 6);
    assert_eq!(network.instantiate().len(), network.node_count());
}

#[test]
fn test_config_weights_parsed_at_compile_time() {
    let f = ConstraintFactory::new();
    let config = solverforge_config::SessionConfig::new().with_constraint_weight("late", "0hard/-4soft");
    let network = CompiledNetwork::build_with_config(
        [f.for_each::<Shift>().penalize(HardSoftScore::ONE_SOFT).as_constraint("late")],
        &config,
    )
    .unwrap();
    assert_eq!(network.constraint_weight("late"), Some(HardSoftScore::of_soft(-4)));

    let bad = solverforge_config::SessionConfig::new().with_constraint_weight("late", "four");
    let result = CompiledNetwork::build_with_config(
        [f.for_each::<Shift>().penalize(HardSoftScore::ONE_SOFT).as_constraint("late")],
        &bad,
    );
    assert!(matches!(result, Err(ScoringError::InvalidWeight { .. })));
}
