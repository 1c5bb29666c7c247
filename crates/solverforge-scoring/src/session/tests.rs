use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use solverforge_config::{EnvironmentMode, SessionConfig};
use solverforge_core::{HardSoftScore, SimpleScore};

use super::*;
use crate::stream::ConstraintFactory;
use crate::tuple::Slot;

#[derive(Debug)]
struct Job {
    minutes: AtomicI64,
}

impl Job {
    fn new(minutes: i64) -> Arc<Self> {
        Arc::new(Job {
            minutes: AtomicI64::new(minutes),
        })
    }

    fn minutes(&self) -> i64 {
        self.minutes.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct Unread;

fn overtime_network() -> Arc<CompiledNetwork<SimpleScore>> {
    let f = ConstraintFactory::with_package("jobs");
    let overtime = f
        .for_each::<Job>()
        .filter(|j: &Job| j.minutes() > 60)
        .penalize(SimpleScore::ONE)
        .with_match_weight(|j: &Job| j.minutes() - 60)
        .as_constraint("Overtime");
    Arc::new(CompiledNetwork::build([overtime]).unwrap())
}

fn tracked() -> SessionConfig {
    SessionConfig::new().with_constraint_match_enabled(true)
}

#[test]
fn test_inserted_arc_reaches_its_source() {
    let mut session = Session::new(overtime_network());
    session.insert(Job::new(90)).unwrap();
    session.insert(Job::new(30)).unwrap();
    session.settle().unwrap();

    assert!(session.live_tuple_count() > 0);
    assert_eq!(session.score().unwrap(), SimpleScore::of(-30));
}

#[test]
fn test_usage_errors_raised_at_call_time() {
    let mut session = Session::new(overtime_network());
    let job = Job::new(90);

    session.insert(job.clone()).unwrap();
    assert!(matches!(
        session.insert(job.clone()),
        Err(ScoringError::DuplicateFact { .. })
    ));
    assert!(matches!(
        session.update(Job::new(1)),
        Err(ScoringError::UnknownFact { .. })
    ));
    assert!(matches!(
        session.score(),
        Err(ScoringError::PendingEvents { count: 1 })
    ));

    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(-30));

    session.retract(job.clone()).unwrap();
    assert!(matches!(
        session.retract(job),
        Err(ScoringError::UnknownFact { .. })
    ));
    assert!(!session.is_poisoned());
}

#[test]
fn test_settle_is_idempotent_on_empty_queue() {
    let mut session = Session::new(overtime_network());
    session.insert(Job::new(70)).unwrap();
    session.settle().unwrap();
    let live = session.live_tuple_count();

    session.settle().unwrap();
    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(-10));
    assert_eq!(session.live_tuple_count(), live);
}

#[test]
fn test_events_drained_in_order() {
    let mut session = Session::new(overtime_network());
    let job = Job::new(80);

    // insert, retract and insert again before one settle
    session.insert(job.clone()).unwrap();
    session.retract(job.clone()).unwrap();
    session.insert(job.clone()).unwrap();
    job.minutes.store(100, Ordering::Relaxed);
    session.update(job.clone()).unwrap();
    assert_eq!(session.pending_event_count(), 4);
    assert_eq!(session.fact_count(), 1);

    session.settle().unwrap();
    assert_eq!(session.score().unwrap(), SimpleScore::of(-40));
    assert_eq!(session.live_tuple_count(), 1);
    assert_eq!(session.pending_event_count(), 0);
}

#[test]
fn test_unread_fact_types_accepted() {
    let mut session = Session::new(overtime_network());
    let unread = Arc::new(Unread);
    session.insert(unread.clone()).unwrap();
    session.update(unread.clone()).unwrap();
    session.settle().unwrap();
    assert_eq!(session.fact_count(), 1);
    assert_eq!(session.live_tuple_count(), 0);

    session.retract(unread).unwrap();
    session.settle().unwrap();
    assert_eq!(session.fact_count(), 0);
    assert!(session.facts.is_empty());
}

#[test]
fn test_match_analysis_requires_opt_in() {
    let mut session = Session::new(overtime_network());
    session.insert(Job::new(61)).unwrap();
    session.settle().unwrap();

    assert!(matches!(
        session.constraint_matches(),
        Err(ScoringError::ConstraintMatchDisabled)
    ));
    assert!(matches!(
        session.indictments(),
        Err(ScoringError::ConstraintMatchDisabled)
    ));

    let results = session.constraint_scores().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "jobs/Overtime");
    assert_eq!(results[0].score, SimpleScore::of(-1));
    assert_eq!(results[0].match_count, 1);
}

#[test]
fn test_explain_and_indict() {
    let mut session = Session::with_config(overtime_network(), &tracked());
    let long = Job::new(100);
    let short = Job::new(30);
    let longer = Job::new(65);
    for job in [&long, &short, &longer] {
        session.insert(job.clone()).unwrap();
    }
    session.settle().unwrap();

    let explanation = session.explain().unwrap();
    assert_eq!(explanation.score, SimpleScore::of(-45));
    assert_eq!(explanation.total_match_count(), 2);
    let analysis = &explanation.constraint_analyses[0];
    assert_eq!(analysis.name(), "Overtime");
    assert_eq!(analysis.weight, SimpleScore::ONE);
    assert!(!analysis.is_hard);

    let indictments = session.indictments().unwrap();
    assert_eq!(indictments.len(), 2);
    let long_ref = FactRef::from(long.clone());
    assert_eq!(indictments.get_fact(&long_ref).unwrap().score, SimpleScore::of(-40));
    assert!(indictments.get_fact(&FactRef::from(short)).is_none());
    assert_eq!(indictments.worst_entities()[0].fact(), &long_ref);

    session.retract(long).unwrap();
    session.settle().unwrap();
    assert_eq!(session.explain().unwrap().total_match_count(), 1);
}

#[test]
fn test_hard_weight_reported_hard() {
    let f = ConstraintFactory::new();
    let network = CompiledNetwork::build([f
        .for_each::<Job>()
        .penalize(HardSoftScore::ONE_HARD)
        .as_constraint("Any job")])
    .unwrap();
    let mut session = Session::new(network);
    session.insert(Job::new(1)).unwrap();
    session.settle().unwrap();

    let results = session.constraint_scores().unwrap();
    assert!(results[0].is_hard);
    assert_eq!(session.score().unwrap(), HardSoftScore::of_hard(-1));
}

#[test]
fn test_trace_callback_sees_impacts() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let mut session = Session::new(overtime_network());
    session.set_trace(move |event: &TraceEvent<'_, SimpleScore>| {
        sink.lock().unwrap().push(event.to_string());
    });

    let job = Job::new(70);
    session.insert(job.clone()).unwrap();
    session.settle().unwrap();
    job.minutes.store(75, Ordering::Relaxed);
    session.update(job.clone()).unwrap();
    session.settle().unwrap();
    session.clear_trace();
    session.retract(job).unwrap();
    session.settle().unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen[0].starts_with("impact jobs/Overtime -10"));
    assert!(seen[1].starts_with("undo jobs/Overtime -10"));
    assert!(seen[2].starts_with("impact jobs/Overtime -15"));
}

#[test]
fn test_corruption_poisons_session() {
    let mut session = Session::new(overtime_network());
    let job = Job::new(90);
    session.insert(job.clone()).unwrap();
    session.settle().unwrap();

    // lose the scorer's undo handle
    let tuple = session.facts[&FactRef::from(job.clone()).key()].tuple.unwrap();
    let scorer_slot = 1;
    let taken = session.rt.arena.take_slot(tuple, scorer_slot).unwrap();
    assert!(matches!(taken, Slot::Impact(_)));

    session.retract(job).unwrap();
    let err = session.settle().unwrap_err();
    assert!(err.is_corruption());
    assert!(session.is_poisoned());
    assert!(matches!(session.settle(), Err(ScoringError::SessionPoisoned)));
    assert!(matches!(session.score(), Err(ScoringError::SessionPoisoned)));
    assert!(matches!(
        session.insert(Job::new(1)),
        Err(ScoringError::SessionPoisoned)
    ));
}

#[test]
fn test_consistency_check_names_diverging_constraint() {
    let mut session = Session::new(overtime_network());
    session.insert(Job::new(90)).unwrap();
    session.settle().unwrap();
    assert!(session.assert_consistency().is_ok());

    // an impact no node knows about
    let _leak = session.rt.inliner.impact(0, SimpleScore::of(-5), &[]);
    match session.assert_consistency() {
        Err(ScoringError::ScoreCorruption { divergences }) => {
            assert_eq!(divergences.len(), 1);
            assert_eq!(divergences[0].constraint, "jobs/Overtime");
            assert_eq!(divergences[0].incremental, "-35");
            assert_eq!(divergences[0].from_scratch, "-30");
        }
        other => panic!("expected score corruption, got {:?}", other),
    }
}

#[test]
fn test_full_assert_checks_every_settle() {
    let config = SessionConfig::new().with_environment_mode(EnvironmentMode::FullAssert);
    let mut session = Session::with_config(overtime_network(), &config);
    let job = Job::new(90);
    session.insert(job.clone()).unwrap();
    session.settle().unwrap();

    let _leak = session.rt.inliner.impact(0, SimpleScore::of(-1), &[]);
    session.update(job).unwrap();
    assert!(matches!(
        session.settle(),
        Err(ScoringError::ScoreCorruption { .. })
    ));
    assert!(session.is_poisoned());
}

#[test]
fn test_fast_assert_checks_on_interval() {
    let config = SessionConfig::new()
        .with_environment_mode(EnvironmentMode::FastAssert)
        .with_assert_interval(2);
    let mut session = Session::with_config(overtime_network(), &config);
    let job = Job::new(90);
    session.insert(job.clone()).unwrap();
    session.settle().unwrap();

    let _leak = session.rt.inliner.impact(0, SimpleScore::of(-1), &[]);
    session.update(job.clone()).unwrap();
    // second settle is checked
    assert!(session.settle().is_err());
}
