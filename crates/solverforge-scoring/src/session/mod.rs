//! Scoring sessions: the mutable half of incremental scoring.
//!
//! A [`Session`] owns live nodes instantiated from a shared
//! [`CompiledNetwork`], the fact table and the event queue. Fact changes are
//! validated when they are reported but only propagated by
//! [`Session::settle`], so a move that touches several facts pays for one
//! propagation pass.

mod inliner;
mod trace;

#[cfg(test)]
mod tests;

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use solverforge_config::SessionConfig;
use solverforge_core::{Score, ScoreLevel};

use crate::api::{
    ConstraintAnalysis, ConstraintJustification, ConstraintResult, DetailedConstraintMatch,
    IndictmentMap, ScoreExplanation,
};
use crate::error::{Result, ScoreDivergence, ScoringError};
use crate::fact::{FactKey, FactRef};
use crate::network::CompiledNetwork;
use crate::node::{self, Node, Runtime, SourceNode};
use crate::tuple::{TupleArena, TupleId};

pub(crate) use inliner::ScoreInliner;
pub use inliner::UndoScoreImpacter;
pub use trace::{TraceEvent, TraceFn};

#[derive(Debug, Clone, Copy)]
enum Event {
    Insert(FactKey),
    Update(FactKey),
    Retract(FactKey),
}

struct FactEntry {
    fact: FactRef,
    /// Source tuple once an insert has been propagated.
    tuple: Option<TupleId>,
    /// Whether the fact is inserted from the caller's point of view.
    present: bool,
    /// Queued events naming this fact.
    pending: usize,
}

/// Incremental score of a set of facts under a compiled network.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use solverforge_core::SimpleScore;
/// use solverforge_scoring::stream::ConstraintFactory;
/// use solverforge_scoring::{CompiledNetwork, Session};
///
/// #[derive(Debug)]
/// struct Task { minutes: i64 }
///
/// let factory = ConstraintFactory::new();
/// let long = factory.for_each::<Task>()
///     .filter(|t: &Task| t.minutes > 60)
///     .penalize(SimpleScore::ONE)
///     .as_constraint("Long task");
/// let network = Arc::new(CompiledNetwork::build([long]).unwrap());
///
/// let mut session = Session::new(network);
/// let task = Arc::new(Task { minutes: 90 });
/// session.insert(task.clone()).unwrap();
/// session.settle().unwrap();
/// assert_eq!(session.score().unwrap(), SimpleScore::of(-1));
///
/// session.retract(task).unwrap();
/// session.settle().unwrap();
/// assert_eq!(session.score().unwrap(), SimpleScore::of(0));
/// ```
pub struct Session<Sc: Score> {
    network: Arc<CompiledNetwork<Sc>>,
    nodes: Vec<Box<dyn Node<Sc>>>,
    rt: Runtime<Sc>,
    events: VecDeque<Event>,
    facts: IndexMap<FactKey, FactEntry>,
    present: usize,
    config: SessionConfig,
    settles: u64,
    poisoned: bool,
}

impl<Sc: Score> Session<Sc> {
    /// Creates a session with the default configuration.
    pub fn new(network: impl Into<Arc<CompiledNetwork<Sc>>>) -> Self {
        Self::with_config(network, &SessionConfig::default())
    }

    /// Creates a session with the given assertion mode and match tracking.
    ///
    /// Weight overrides in the config take effect at compile time, see
    /// [`CompiledNetwork::build_with_config`].
    pub fn with_config(network: impl Into<Arc<CompiledNetwork<Sc>>>, config: &SessionConfig) -> Self {
        let session = Self::create(network.into(), config.clone());
        debug!(
            event = "session_created",
            node_count = session.nodes.len(),
            environment_mode = ?config.environment_mode,
            constraint_match_enabled = config.constraint_match_enabled,
        );
        session
    }

    fn create(network: Arc<CompiledNetwork<Sc>>, config: SessionConfig) -> Self {
        let nodes = network.instantiate();
        let inliner = ScoreInliner::new(
            network.constraints().iter().cloned(),
            config.constraint_match_enabled,
        );
        Self {
            network,
            nodes,
            rt: Runtime {
                arena: TupleArena::new(),
                inliner,
            },
            events: VecDeque::new(),
            facts: IndexMap::new(),
            present: 0,
            config,
            settles: 0,
            poisoned: false,
        }
    }

    pub fn network(&self) -> &Arc<CompiledNetwork<Sc>> {
        &self.network
    }

    /// Queues the insertion of a fact not currently inserted.
    pub fn insert(&mut self, fact: impl Into<FactRef>) -> Result<()> {
        self.check_poisoned()?;
        let fact = fact.into();
        let key = fact.key();
        match self.facts.get_mut(&key) {
            Some(entry) if entry.present => {
                return Err(ScoringError::DuplicateFact {
                    fact: format!("{:?}", fact),
                })
            }
            Some(entry) => {
                entry.present = true;
                entry.pending += 1;
            }
            None => {
                self.facts.insert(
                    key,
                    FactEntry {
                        fact,
                        tuple: None,
                        present: true,
                        pending: 1,
                    },
                );
            }
        }
        self.present += 1;
        self.events.push_back(Event::Insert(key));
        Ok(())
    }

    /// Queues a re-evaluation of an inserted fact whose state changed.
    pub fn update(&mut self, fact: impl Into<FactRef>) -> Result<()> {
        self.check_poisoned()?;
        let fact = fact.into();
        let key = fact.key();
        let entry = self.live_entry(&fact)?;
        entry.pending += 1;
        self.events.push_back(Event::Update(key));
        Ok(())
    }

    /// Queues the removal of an inserted fact.
    pub fn retract(&mut self, fact: impl Into<FactRef>) -> Result<()> {
        self.check_poisoned()?;
        let fact = fact.into();
        let key = fact.key();
        let entry = self.live_entry(&fact)?;
        entry.present = false;
        entry.pending += 1;
        self.present -= 1;
        self.events.push_back(Event::Retract(key));
        Ok(())
    }

    fn live_entry(&mut self, fact: &FactRef) -> Result<&mut FactEntry> {
        match self.facts.get_mut(&fact.key()) {
            Some(entry) if entry.present => Ok(entry),
            _ => Err(ScoringError::UnknownFact {
                fact: format!("{:?}", fact),
            }),
        }
    }

    /// Drains the event queue and propagates it through the network.
    ///
    /// Idempotent on an empty queue. An error leaves the session poisoned.
    pub fn settle(&mut self) -> Result<()> {
        self.check_poisoned()?;
        if self.events.is_empty() {
            return Ok(());
        }
        let drained = self.events.len();
        let result = self.drain().and_then(|()| {
            node::settle(
                &mut self.nodes,
                self.network.children(),
                self.network.layers(),
                &mut self.rt,
            )
        });
        if let Err(err) = result {
            warn!(event = "session_poisoned", corruption = err.is_corruption(), error = %err);
            self.poisoned = true;
            return Err(err);
        }

        self.settles += 1;
        trace!(
            event = "settle",
            settle = self.settles,
            events = drained,
            live_tuples = self.rt.arena.live_count(),
            score = %self.rt.inliner.total(),
        );

        if self.config.assertion_due(self.settles) {
            if let Err(err) = self.assert_consistency() {
                self.poisoned = true;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Feeds queued events to the source nodes, in enqueue order.
    fn drain(&mut self) -> Result<()> {
        while let Some(event) = self.events.pop_front() {
            let key = match event {
                Event::Insert(key) | Event::Update(key) | Event::Retract(key) => key,
            };
            let Some(entry) = self.facts.get_mut(&key) else {
                continue;
            };
            let source = match self.network.source_for(entry.fact.fact_type()) {
                Some(id) => self.nodes[id].as_source(),
                None => None,
            };
            if let Some(source) = source {
                apply(source, &mut self.rt.arena, entry, event)?;
            }

            entry.pending -= 1;
            if entry.pending == 0 && !entry.present {
                self.facts.swap_remove(&key);
            }
        }
        Ok(())
    }

    /// Current score. Only valid with an empty event queue.
    pub fn score(&self) -> Result<Sc> {
        self.check_settled()?;
        Ok(self.rt.inliner.total())
    }

    /// Score and match count of every compiled constraint.
    pub fn constraint_scores(&self) -> Result<Vec<ConstraintResult<Sc>>> {
        self.check_settled()?;
        Ok(self
            .rt
            .inliner
            .tallies()
            .iter()
            .map(|tally| ConstraintResult {
                name: tally.constraint.full_name(),
                score: tally.score,
                match_count: tally.match_count,
                is_hard: is_hard(&tally.weight),
            })
            .collect())
    }

    /// Live matches of every constraint, with their justifying facts.
    ///
    /// Requires `constraint_match_enabled`.
    pub fn constraint_matches(&self) -> Result<Vec<ConstraintAnalysis<Sc>>> {
        self.check_settled()?;
        if !self.rt.inliner.track_matches() {
            return Err(ScoringError::ConstraintMatchDisabled);
        }
        Ok(self
            .rt
            .inliner
            .tallies()
            .iter()
            .map(|tally| {
                let matches = tally
                    .matches
                    .values()
                    .map(|record| {
                        DetailedConstraintMatch::new(
                            tally.constraint.clone(),
                            record.score,
                            ConstraintJustification::from_facts(&record.facts),
                        )
                    })
                    .collect();
                ConstraintAnalysis::new(
                    tally.constraint.clone(),
                    tally.weight,
                    tally.score,
                    matches,
                    is_hard(&tally.weight),
                )
            })
            .collect())
    }

    pub fn explain(&self) -> Result<ScoreExplanation<Sc>> {
        let analyses = self.constraint_matches()?;
        Ok(ScoreExplanation::new(self.rt.inliner.total(), analyses))
    }

    /// Per-fact blame, keyed by fact identity.
    pub fn indictments(&self) -> Result<IndictmentMap<Sc>> {
        let matches = self
            .constraint_matches()?
            .into_iter()
            .flat_map(|analysis| analysis.matches)
            .collect();
        Ok(IndictmentMap::from_matches(matches))
    }

    /// Installs a callback that sees every score impact and undo.
    pub fn set_trace<F>(&mut self, trace: F)
    where
        F: FnMut(&TraceEvent<'_, Sc>) + Send + 'static,
    {
        self.rt.inliner.set_trace(Some(Box::new(trace)));
    }

    pub fn clear_trace(&mut self) {
        self.rt.inliner.set_trace(None);
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    /// Facts inserted and not retracted, counting queued events.
    pub fn fact_count(&self) -> usize {
        self.present
    }

    /// Tuples alive in the arena, at every node.
    pub fn live_tuple_count(&self) -> usize {
        self.rt.arena.live_count()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Rescores the inserted facts in a fresh session over the same network
    /// and compares every constraint total with the incremental one.
    pub fn assert_consistency(&self) -> Result<()> {
        self.check_settled()?;
        let mut fresh = Self::create(self.network.clone(), SessionConfig::default());
        for entry in self.facts.values().filter(|e| e.present) {
            fresh.insert(entry.fact.clone())?;
        }
        fresh.settle()?;

        let divergences: Vec<ScoreDivergence> = self
            .rt
            .inliner
            .tallies()
            .iter()
            .zip(fresh.rt.inliner.tallies())
            .filter(|(incremental, scratch)| incremental.score != scratch.score)
            .map(|(incremental, scratch)| ScoreDivergence {
                constraint: incremental.constraint.full_name(),
                incremental: incremental.score.to_string(),
                from_scratch: scratch.score.to_string(),
            })
            .collect();
        trace!(
            event = "consistency_check",
            facts = self.present,
            diverging = divergences.len(),
        );

        if divergences.is_empty() {
            return Ok(());
        }
        for divergence in &divergences {
            warn!(
                event = "score_corruption",
                constraint = %divergence.constraint,
                incremental = %divergence.incremental,
                from_scratch = %divergence.from_scratch,
            );
        }
        Err(ScoringError::ScoreCorruption { divergences })
    }

    fn check_poisoned(&self) -> Result<()> {
        if self.poisoned {
            Err(ScoringError::SessionPoisoned)
        } else {
            Ok(())
        }
    }

    fn check_settled(&self) -> Result<()> {
        self.check_poisoned()?;
        if self.events.is_empty() {
            Ok(())
        } else {
            Err(ScoringError::PendingEvents {
                count: self.events.len(),
            })
        }
    }
}

fn apply<Sc>(
    source: &mut SourceNode,
    arena: &mut TupleArena<Sc>,
    entry: &mut FactEntry,
    event: Event,
) -> Result<()> {
    match event {
        Event::Insert(_) => {
            entry.tuple = Some(source.insert_fact(arena, entry.fact.clone()));
        }
        Event::Update(_) => {
            if let Some(tuple) = entry.tuple {
                source.update_fact(arena, tuple)?;
            }
        }
        Event::Retract(_) => {
            if let Some(tuple) = entry.tuple.take() {
                source.retract_fact(arena, tuple)?;
            }
        }
    }
    Ok(())
}

/// A constraint is hard when its weight touches a hard score level.
fn is_hard<Sc: Score>(weight: &Sc) -> bool {
    weight
        .to_level_numbers()
        .iter()
        .enumerate()
        .any(|(level, &value)| value != 0 && Sc::level_label(level) == Some(ScoreLevel::Hard))
}

impl<Sc: Score> fmt::Debug for Session<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("facts", &self.present)
            .field("pending_events", &self.events.len())
            .field("live_tuples", &self.rt.arena.live_count())
            .field("score", &self.rt.inliner.total())
            .field("poisoned", &self.poisoned)
            .finish()
    }
}
