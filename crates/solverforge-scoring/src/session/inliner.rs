//! Running score totals and their undo handles.

use indexmap::IndexMap;

use solverforge_core::{ConstraintRef, Score};

use crate::fact::FactRef;

use super::trace::{TraceEvent, TraceFn};

/// One-shot capability to reverse a score impact.
///
/// Not `Clone`: [`ScoreInliner::undo`] consumes it, so an impact can be
/// reversed at most once.
#[must_use = "an impact that is never undone leaks into the score"]
#[derive(Debug)]
pub struct UndoScoreImpacter<Sc> {
    constraint: usize,
    delta: Sc,
    match_id: Option<u64>,
}

impl<Sc: Copy> UndoScoreImpacter<Sc> {
    /// The delta that undoing will subtract.
    pub fn delta(&self) -> Sc {
        self.delta
    }
}

/// A live match kept when constraint match tracking is enabled.
#[derive(Debug, Clone)]
pub(crate) struct MatchRecord<Sc> {
    pub(crate) score: Sc,
    pub(crate) facts: Vec<FactRef>,
}

pub(crate) struct ConstraintTally<Sc> {
    pub(crate) constraint: ConstraintRef,
    pub(crate) weight: Sc,
    pub(crate) score: Sc,
    pub(crate) match_count: usize,
    pub(crate) matches: IndexMap<u64, MatchRecord<Sc>>,
}

/// Per-constraint and total score, maintained one impact at a time.
pub(crate) struct ScoreInliner<Sc: Score> {
    tallies: Vec<ConstraintTally<Sc>>,
    total: Sc,
    track_matches: bool,
    next_match_id: u64,
    trace: Option<TraceFn<Sc>>,
}

impl<Sc: Score> ScoreInliner<Sc> {
    pub(crate) fn new(
        constraints: impl IntoIterator<Item = (ConstraintRef, Sc)>,
        track_matches: bool,
    ) -> Self {
        let tallies = constraints
            .into_iter()
            .map(|(constraint, weight)| ConstraintTally {
                constraint,
                weight,
                score: Sc::zero(),
                match_count: 0,
                matches: IndexMap::new(),
            })
            .collect();
        Self {
            tallies,
            total: Sc::zero(),
            track_matches,
            next_match_id: 0,
            trace: None,
        }
    }

    pub(crate) fn set_trace(&mut self, trace: Option<TraceFn<Sc>>) {
        self.trace = trace;
    }

    pub(crate) fn total(&self) -> Sc {
        self.total
    }

    pub(crate) fn tallies(&self) -> &[ConstraintTally<Sc>] {
        &self.tallies
    }

    pub(crate) fn track_matches(&self) -> bool {
        self.track_matches
    }

    /// Adds `delta` to the constraint's total.
    pub(crate) fn impact(
        &mut self,
        constraint: usize,
        delta: Sc,
        facts: &[FactRef],
    ) -> UndoScoreImpacter<Sc> {
        let tally = &mut self.tallies[constraint];
        tally.score = tally.score + delta;
        tally.match_count += 1;
        self.total = self.total + delta;

        let match_id = if self.track_matches {
            let id = self.next_match_id;
            self.next_match_id += 1;
            tally.matches.insert(
                id,
                MatchRecord {
                    score: delta,
                    facts: facts.to_vec(),
                },
            );
            Some(id)
        } else {
            None
        };

        if let Some(trace) = self.trace.as_mut() {
            trace(&TraceEvent::Impact {
                constraint: &tally.constraint,
                delta,
                facts,
            });
        }

        UndoScoreImpacter {
            constraint,
            delta,
            match_id,
        }
    }

    /// Reverses exactly the impact the handle was issued for.
    pub(crate) fn undo(&mut self, undo: UndoScoreImpacter<Sc>) {
        let tally = &mut self.tallies[undo.constraint];
        tally.score = tally.score - undo.delta;
        tally.match_count -= 1;
        self.total = self.total - undo.delta;

        if let Some(id) = undo.match_id {
            let removed = tally.matches.swap_remove(&id);
            debug_assert!(removed.is_some(), "match {} undone twice", id);
        }

        if let Some(trace) = self.trace.as_mut() {
            trace(&TraceEvent::Undo {
                constraint: &tally.constraint,
                delta: undo.delta,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use solverforge_core::SimpleScore;

    fn inliner(track: bool) -> ScoreInliner<SimpleScore> {
        ScoreInliner::new(
            [
                (ConstraintRef::new("", "a"), SimpleScore::ONE),
                (ConstraintRef::new("", "b"), SimpleScore::ONE),
            ],
            track,
        )
    }

    #[test]
    fn test_impact_and_undo_restore_totals() {
        let mut inliner = inliner(false);
        let u1 = inliner.impact(0, SimpleScore::of(-3), &[]);
        let u2 = inliner.impact(1, SimpleScore::of(5), &[]);
        assert_eq!(inliner.total(), SimpleScore::of(2));
        assert_eq!(inliner.tallies()[0].match_count, 1);

        inliner.undo(u1);
        assert_eq!(inliner.total(), SimpleScore::of(5));
        assert_eq!(inliner.tallies()[0].score, SimpleScore::zero());
        inliner.undo(u2);
        assert_eq!(inliner.total(), SimpleScore::zero());
    }

    #[test]
    fn test_matches_tracked_when_enabled() {
        let mut inliner = inliner(true);
        let fact = FactRef::new(1u8);
        let undo = inliner.impact(0, SimpleScore::of(-1), &[fact.clone()]);
        assert_eq!(inliner.tallies()[0].matches.len(), 1);
        let (_, record) = inliner.tallies()[0].matches.get_index(0).unwrap();
        assert_eq!(record.facts, vec![fact]);

        inliner.undo(undo);
        assert!(inliner.tallies()[0].matches.is_empty());
    }

    #[test]
    fn test_trace_sees_impacts_and_undos() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut inliner = inliner(false);
        inliner.set_trace(Some(Box::new(move |event: &TraceEvent<'_, SimpleScore>| {
            sink.lock().unwrap().push(event.to_string());
        })));

        let undo = inliner.impact(1, SimpleScore::of(4), &[]);
        inliner.undo(undo);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].starts_with("impact b"));
        assert!(seen[1].starts_with("undo b"));
    }
}
