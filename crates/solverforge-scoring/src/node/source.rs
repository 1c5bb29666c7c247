use smallvec::smallvec;

use solverforge_core::Score;

use crate::error::{Result, ScoringError};
use crate::fact::FactRef;
use crate::tuple::{TupleArena, TupleId, TupleState};

use super::{Input, Node, Phase, PropagationQueue, Runtime, Signal};

/// Entry point for one fact type. Fed by the session, never by a parent.
pub(crate) struct SourceNode {
    queue: PropagationQueue,
}

impl SourceNode {
    pub(crate) fn new(store_size: usize) -> Self {
        Self {
            queue: PropagationQueue::new(store_size),
        }
    }

    pub(crate) fn insert_fact<Sc>(&mut self, arena: &mut TupleArena<Sc>, fact: FactRef) -> TupleId {
        self.queue.create(arena, smallvec![fact])
    }

    pub(crate) fn update_fact<Sc>(&mut self, arena: &mut TupleArena<Sc>, tuple: TupleId) -> Result<()> {
        self.queue.update(arena, tuple)
    }

    pub(crate) fn retract_fact<Sc>(&mut self, arena: &mut TupleArena<Sc>, tuple: TupleId) -> Result<()> {
        self.queue.retract(arena, tuple)
    }
}

fn no_parent(tuple: TupleId) -> ScoringError {
    ScoringError::ImpossibleState {
        tuple,
        state: TupleState::Ok,
        action: "signal into a source node",
    }
}

impl<Sc: Score> Node<Sc> for SourceNode {
    fn insert(&mut self, _: Input, t: TupleId, _: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        Err(no_parent(t))
    }

    fn update(&mut self, _: Input, t: TupleId, _: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        Err(no_parent(t))
    }

    fn retract(&mut self, _: Input, t: TupleId, _: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        Err(no_parent(t))
    }

    fn propagate(&mut self, phase: Phase, rt: &mut Runtime<Sc>, out: &mut Vec<Signal>) -> Result<()> {
        self.queue.propagate(phase, &mut rt.arena, out)
    }

    fn as_source(&mut self) -> Option<&mut SourceNode> {
        Some(self)
    }
}
