//! Tests for score analysis types.

use super::analysis::*;
use crate::fact::FactRef;
use solverforge_core::score::SimpleScore;
use solverforge_core::ConstraintRef;

#[derive(Debug, PartialEq)]
struct Lesson {
    id: i32,
    instructor: &'static str,
}

fn lesson(id: i32, instructor: &'static str) -> FactRef {
    FactRef::new(Lesson { id, instructor })
}

#[test]
fn test_entity_ref_identity() {
    let a = lesson(1, "Curie");
    let twin = lesson(1, "Curie");

    let entity = EntityRef::new(a.clone());
    assert_eq!(entity.short_type_name(), "Lesson");
    assert!(entity.display.contains("Curie"));
    assert_eq!(entity.as_entity::<Lesson>().map(|l| l.id), Some(1));

    assert_eq!(entity, EntityRef::new(a));
    assert_ne!(entity, EntityRef::new(twin));
}

#[test]
fn test_constraint_justification() {
    let just = ConstraintJustification::from_facts(&[lesson(1, "Curie"), lesson(2, "Turing")]);

    assert_eq!(just.entities.len(), 2);
    assert!(just.description.contains("Curie"));
    assert!(just.description.contains("Turing"));
    assert_eq!(ConstraintJustification::new(vec![]).description, "No entities");
}

#[test]
fn test_indictment_map() {
    let conflict = ConstraintRef::new("school", "Teacher conflict");
    let gap = ConstraintRef::new("school", "Gap");
    let a = lesson(1, "Curie");
    let b = lesson(2, "Curie");

    let matches = vec![
        DetailedConstraintMatch::new(
            conflict.clone(),
            SimpleScore::of(-2),
            ConstraintJustification::from_facts(&[a.clone(), b.clone()]),
        ),
        DetailedConstraintMatch::new(
            gap.clone(),
            SimpleScore::of(-1),
            ConstraintJustification::from_facts(&[a.clone()]),
        ),
    ];
    let map = IndictmentMap::from_matches(matches);

    assert_eq!(map.len(), 2);
    let of_a = map.get_fact(&a).unwrap();
    assert_eq!(of_a.match_count(), 2);
    assert_eq!(of_a.constraint_count(), 2);
    assert_eq!(of_a.score, SimpleScore::of(-3));
    assert_eq!(map.get_fact(&b).unwrap().score, SimpleScore::of(-2));
    assert_eq!(map.worst_entities()[0].fact(), &a);
}

#[test]
fn test_fact_twice_in_tuple_indicted_once() {
    let a = lesson(1, "Curie");
    let map = IndictmentMap::from_matches(vec![DetailedConstraintMatch::new(
        ConstraintRef::new("", "Self"),
        SimpleScore::of(-1),
        ConstraintJustification::from_facts(&[a.clone(), a.clone()]),
    )]);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get_fact(&a).unwrap().score, SimpleScore::of(-1));
}

#[test]
fn test_score_explanation() {
    let analysis = ConstraintAnalysis::new(
        ConstraintRef::new("", "TestConstraint"),
        SimpleScore::of(1),
        SimpleScore::of(-3),
        vec![],
        false,
    );
    let idle = ConstraintAnalysis::new(
        ConstraintRef::new("", "Idle"),
        SimpleScore::of(1),
        SimpleScore::of(0),
        vec![],
        false,
    );

    let explanation = ScoreExplanation::new(SimpleScore::of(-3), vec![analysis, idle]);

    assert_eq!(explanation.constraint_analyses.len(), 2);
    assert_eq!(explanation.non_zero_constraints().len(), 1);
    assert_eq!(explanation.total_match_count(), 0);
}
