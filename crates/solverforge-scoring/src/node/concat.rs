use solverforge_core::Score;

use crate::error::Result;
use crate::tuple::{corrupt, Slot, TupleId};

use super::{Input, Node, Phase, PropagationQueue, Runtime, Signal};

/// Emits a copy of every tuple of either input, so both streams continue as
/// one. A stream concatenated with itself yields every tuple twice.
pub(crate) struct ConcatNode {
    left_slot: usize,
    right_slot: usize,
    queue: PropagationQueue,
}

impl ConcatNode {
    pub(crate) fn new(left_slot: usize, right_slot: usize, store_size: usize) -> Self {
        Self {
            left_slot,
            right_slot,
            queue: PropagationQueue::new(store_size),
        }
    }

    fn slot(&self, input: Input) -> usize {
        match input {
            Input::Left => self.left_slot,
            Input::Right => self.right_slot,
        }
    }
}

impl<Sc: Score> Node<Sc> for ConcatNode {
    fn insert(&mut self, input: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let facts = rt.arena.get(t)?.facts.clone();
        let copy = self.queue.create(&mut rt.arena, facts);
        rt.arena.set_slot(t, self.slot(input), Slot::Tuple(copy))
    }

    fn update(&mut self, input: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let slot = self.slot(input);
        let copy = rt
            .arena
            .tuple_ref(t, slot)?
            .ok_or_else(|| corrupt(t, slot, "concatenated tuple"))?;
        let facts = rt.arena.get(t)?.facts.clone();
        rt.arena.get_mut(copy)?.facts = facts;
        self.queue.update(&mut rt.arena, copy)
    }

    fn retract(&mut self, input: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let slot = self.slot(input);
        let copy = rt
            .arena
            .take_tuple(t, slot)?
            .ok_or_else(|| corrupt(t, slot, "concatenated tuple"))?;
        self.queue.retract(&mut rt.arena, copy)
    }

    fn propagate(&mut self, phase: Phase, rt: &mut Runtime<Sc>, out: &mut Vec<Signal>) -> Result<()> {
        self.queue.propagate(phase, &mut rt.arena, out)
    }
}
