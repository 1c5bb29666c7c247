//! Incremental scores checked against from-scratch reference calculations.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use solverforge_core::{HardSoftScore, SimpleScore};
use solverforge_scoring::stream::collector::{count, sum};
use solverforge_scoring::stream::joiner::{equal, equal_bi};
use solverforge_scoring::stream::{Constraint, ConstraintFactory};
use solverforge_scoring::{CompiledNetwork, Session};
use solverforge_test::nqueens::{board, conflict_score};
use solverforge_test::roster::{missing_skills, overlapping_pairs};
use solverforge_test::{Employee, Queen, Shift, Task};

fn session<Sc: solverforge_core::Score>(constraints: Vec<Constraint<Sc>>) -> Session<Sc> {
    Session::new(CompiledNetwork::build(constraints).unwrap())
}

fn total_weight() -> Constraint<SimpleScore> {
    ConstraintFactory::with_package("tasks")
        .for_each::<Task>()
        .group_by(|_: &Task| (), sum(|t: &Task| t.weight()))
        .penalize(SimpleScore::ONE)
        .with_match_weight(|_: &(), total: &i64| *total)
        .as_constraint("Total weight")
}

#[test]
fn test_group_sum_follows_inserts_and_retracts() {
    let tasks = [Task::new(1, 0, 10), Task::new(2, 0, 20), Task::new(3, 0, 30)];
    let mut session = session(vec![total_weight()]);
    for task in &tasks {
        session.insert(task.clone()).unwrap();
    }
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(-60));

    session.retract(tasks[1].clone()).unwrap();
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(-40));

    session.insert(tasks[1].clone()).unwrap();
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(-60));

    tasks[2].set_weight(5);
    session.update(tasks[2].clone()).unwrap();
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(-35));
    session.assert_consistency().unwrap();
}

#[test]
fn test_aggregate_disappears_with_last_fact() {
    let task_count = ConstraintFactory::new()
        .for_each::<Task>()
        .aggregate(count())
        .reward(SimpleScore::ONE)
        .with_match_weight(|n: &usize| *n as i64)
        .as_constraint("Task count");
    let mut session = session(vec![task_count]);
    let task = Task::new(1, 0, 1);

    session.insert(task.clone()).unwrap();
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(1));
    assert_eq!(session.constraint_scores().unwrap()[0].match_count, 1);

    session.retract(task).unwrap();
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::ZERO);
    assert_eq!(session.constraint_scores().unwrap()[0].match_count, 0);
    assert_eq!(session.live_tuple_count(), 0);
}

#[test]
fn test_insert_then_retract_restores_state() {
    let mut session = session(vec![total_weight()]);
    let base = [Task::new(1, 0, 4), Task::new(2, 1, 6)];
    for task in &base {
        session.insert(task.clone()).unwrap();
    }
    session.settle().unwrap();
    let score = session.score().unwrap();
    let tuples = session.live_tuple_count();

    let extra = Task::new(3, 0, 100);
    session.insert(extra.clone()).unwrap();
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(-110));

    session.retract(extra).unwrap();
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), score);
    assert_eq!(session.live_tuple_count(), tuples);
    assert_eq!(session.fact_count(), 2);
}

#[test]
fn test_insert_and_retract_within_one_settle_cancel() {
    let mut session = session(vec![total_weight()]);
    let task = Task::new(1, 0, 7);
    session.insert(task.clone()).unwrap();
    session.retract(task).unwrap();
    assert_eq!(session.pending_event_count(), 2);

    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::ZERO);
    assert_eq!(session.live_tuple_count(), 0);
    assert_eq!(session.fact_count(), 0);
}

fn assigned_to_known_employee() -> Constraint<SimpleScore> {
    ConstraintFactory::new()
        .for_each::<Shift>()
        .join(
            ConstraintFactory::new().for_each::<Employee>(),
            equal_bi(|s: &Shift| s.employee(), |e: &Employee| e.id),
        )
        .reward(SimpleScore::ONE)
        .as_constraint("Staffed")
}

#[test]
fn test_equal_join_matches_every_pair() {
    let employees = [Employee::new(1, "Ann", &[]), Employee::new(2, "Beth", &[])];
    let shifts: Vec<_> = (0..4).map(|i| Shift::new(i, i * 8, i * 8 + 8, "nurse")).collect();
    shifts[0].assign(1);
    shifts[1].assign(1);
    shifts[2].assign(2);

    let mut session = session(vec![assigned_to_known_employee()]);
    for e in &employees {
        session.insert(e.clone()).unwrap();
    }
    for s in &shifts {
        session.insert(s.clone()).unwrap();
    }
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(3));

    // Unassigned shift joins nobody until it is assigned.
    shifts[3].assign(2);
    session.update(shifts[3].clone()).unwrap();
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(4));

    // Retracting an employee drops every pair it took part in.
    session.retract(employees[0].clone()).unwrap();
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(2));

    // Moving a shift to an unknown employee drops its pair.
    shifts[2].assign(9);
    session.update(shifts[2].clone()).unwrap();
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(1));
    session.assert_consistency().unwrap();
}

fn roster_constraints() -> Vec<Constraint<HardSoftScore>> {
    let factory = ConstraintFactory::with_package("roster");
    let missing_skill = factory
        .for_each::<Shift>()
        .join(
            factory.for_each::<Employee>(),
            equal_bi(|s: &Shift| s.employee(), |e: &Employee| e.id),
        )
        .filter(|s: &Shift, e: &Employee| !e.has_skill(s.required_skill))
        .penalize(HardSoftScore::ONE_HARD)
        .as_constraint("Missing skill");
    let overlap = factory
        .for_each_unique_pair(|s: &Shift| s.id, equal(|s: &Shift| s.employee()))
        .filter(|a: &Shift, b: &Shift| a.is_assigned() && a.overlaps(b))
        .penalize(HardSoftScore::ONE_HARD)
        .as_constraint("Overlapping shifts");
    vec![missing_skill, overlap]
}

fn roster_score(shifts: &[Arc<Shift>], employees: &[Arc<Employee>]) -> HardSoftScore {
    HardSoftScore::of_hard(-(missing_skills(shifts, employees) + overlapping_pairs(shifts)))
}

#[test]
fn test_roster_matches_reference_under_random_moves() {
    let employees = vec![
        Employee::new(0, "Ann", &["nurse"]),
        Employee::new(1, "Beth", &["doctor"]),
        Employee::new(2, "Carl", &["nurse", "doctor"]),
    ];
    let skills = ["nurse", "doctor"];
    let shifts: Vec<_> = (0..8)
        .map(|i| Shift::new(i, i * 4, i * 4 + 6, skills[i as usize % 2]))
        .collect();

    let mut session = session(roster_constraints());
    for e in &employees {
        session.insert(e.clone()).unwrap();
    }
    for s in &shifts {
        session.insert(s.clone()).unwrap();
    }
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), roster_score(&shifts, &employees));

    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..200 {
        let shift = &shifts[rng.random_range(0..shifts.len())];
        shift.assign(rng.random_range(-1..3));
        session.update(shift.clone()).unwrap();
        if rng.random_bool(0.5) {
            session.settle().unwrap();
            assert_eq!(session.score().unwrap(), roster_score(&shifts, &employees));
        }
    }
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), roster_score(&shifts, &employees));
    session.assert_consistency().unwrap();
}

fn nqueens_constraints() -> Vec<Constraint<SimpleScore>> {
    let factory = ConstraintFactory::with_package("nqueens");
    vec![
        factory
            .for_each_unique_pair(|q: &Queen| q.id, equal(|q: &Queen| q.row()))
            .penalize(SimpleScore::ONE)
            .as_constraint("Row conflict"),
        factory
            .for_each_unique_pair(|q: &Queen| q.id, equal(|q: &Queen| q.ascending_diagonal()))
            .penalize(SimpleScore::ONE)
            .as_constraint("Ascending diagonal conflict"),
        factory
            .for_each_unique_pair(|q: &Queen| q.id, equal(|q: &Queen| q.descending_diagonal()))
            .penalize(SimpleScore::ONE)
            .as_constraint("Descending diagonal conflict"),
    ]
}

#[test]
fn test_nqueens_matches_brute_force() {
    let queens = board(&[0, 1, 2, 3, 4, 5, 6, 7]);
    let mut session = session(nqueens_constraints());
    for q in &queens {
        session.insert(q.clone()).unwrap();
    }
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), conflict_score(&queens));
    assert_eq!(session.score().unwrap(), SimpleScore::of(-28));

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for _ in 0..300 {
        let queen = &queens[rng.random_range(0..queens.len())];
        queen.set_row(rng.random_range(0..8));
        session.update(queen.clone()).unwrap();
        session.settle().unwrap();
        assert_eq!(session.score().unwrap(), conflict_score(&queens));
    }
}

#[test]
fn test_solved_board_scores_zero() {
    let queens = board(&[1, 3, 0, 2]);
    let mut session = session(nqueens_constraints());
    for q in &queens {
        session.insert(q.clone()).unwrap();
    }
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::ZERO);
    assert!(session
        .constraint_scores()
        .unwrap()
        .iter()
        .all(|c| c.match_count == 0));
}
