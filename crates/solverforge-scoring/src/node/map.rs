use solverforge_core::Score;

use crate::error::Result;
use crate::tuple::{corrupt, FactVec, Slot, TupleId};

use super::{Input, Mapper, Node, Phase, PropagationQueue, Runtime, Signal};

/// One output tuple per input tuple, holding one derived fact per mapper.
pub(crate) struct MapNode {
    mappers: Vec<Mapper>,
    slot: usize,
    queue: PropagationQueue,
}

impl MapNode {
    pub(crate) fn new(mappers: Vec<Mapper>, slot: usize, store_size: usize) -> Self {
        Self {
            mappers,
            slot,
            queue: PropagationQueue::new(store_size),
        }
    }

    fn map<Sc: Score>(&self, rt: &Runtime<Sc>, t: TupleId) -> Result<FactVec> {
        let facts = rt.arena.get(t)?.facts();
        Ok(self.mappers.iter().map(|m| (m.map)(facts)).collect())
    }
}

impl<Sc: Score> Node<Sc> for MapNode {
    fn insert(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let facts = self.map(rt, t)?;
        let mapped = self.queue.create(&mut rt.arena, facts);
        rt.arena.set_slot(t, self.slot, Slot::Tuple(mapped))
    }

    /// Remaps in place; downstream sees an update only if a value changed.
    fn update(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let mapped = rt
            .arena
            .tuple_ref(t, self.slot)?
            .ok_or_else(|| corrupt(t, self.slot, "mapped tuple"))?;
        let facts = self.map(rt, t)?;
        let changed = {
            let old = &rt.arena.get(mapped)?.facts;
            old.iter()
                .zip(facts.iter())
                .zip(self.mappers.iter())
                .any(|((old, new), m)| !(m.same)(old, new))
        };
        if changed {
            rt.arena.get_mut(mapped)?.facts = facts;
            self.queue.update(&mut rt.arena, mapped)?;
        }
        Ok(())
    }

    fn retract(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let mapped = rt
            .arena
            .take_tuple(t, self.slot)?
            .ok_or_else(|| corrupt(t, self.slot, "mapped tuple"))?;
        self.queue.retract(&mut rt.arena, mapped)
    }

    fn propagate(&mut self, phase: Phase, rt: &mut Runtime<Sc>, out: &mut Vec<Signal>) -> Result<()> {
        self.queue.propagate(phase, &mut rt.arena, out)
    }
}
