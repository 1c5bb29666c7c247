use indexmap::IndexSet;

use solverforge_core::Score;

use crate::error::Result;
use crate::fact::FactRef;
use crate::tuple::{FactVec, Slot, TupleArena, TupleId};

use super::{FlattenFn, Input, Node, Phase, PropagationQueue, Runtime, SameFn, Signal};

/// Expands the last fact of each input tuple into zero or more outputs.
///
/// Output tuples keep the input's leading facts and append one item each.
/// On update, items equal to a previous item keep their output tuple.
pub(crate) struct FlattenLastNode {
    flatten: FlattenFn,
    same: SameFn,
    slot: usize,
    queue: PropagationQueue,
}

impl FlattenLastNode {
    pub(crate) fn new(flatten: FlattenFn, same: SameFn, slot: usize, store_size: usize) -> Self {
        Self {
            flatten,
            same,
            slot,
            queue: PropagationQueue::new(store_size),
        }
    }

    fn expand<Sc>(&self, arena: &TupleArena<Sc>, t: TupleId) -> Result<(FactVec, Vec<FactRef>)> {
        let facts = &arena.get(t)?.facts;
        let (last, prefix) = match facts.split_last() {
            Some(split) => split,
            None => return Ok((FactVec::new(), Vec::new())),
        };
        Ok((prefix.iter().cloned().collect(), (self.flatten)(last)))
    }
}

fn with_item(prefix: &FactVec, item: FactRef) -> FactVec {
    let mut facts = prefix.clone();
    facts.push(item);
    facts
}

impl<Sc: Score> Node<Sc> for FlattenLastNode {
    fn insert(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let (prefix, items) = self.expand(&rt.arena, t)?;
        let outputs: IndexSet<TupleId> = items
            .into_iter()
            .map(|item| self.queue.create(&mut rt.arena, with_item(&prefix, item)))
            .collect();
        rt.arena.set_slot(t, self.slot, Slot::Tuples(outputs))
    }

    fn update(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let (prefix, items) = self.expand(&rt.arena, t)?;
        let mut unmatched: Vec<TupleId> = rt.arena.take_tuples(t, self.slot)?.into_iter().collect();
        let mut outputs = IndexSet::with_capacity(items.len());

        for item in items {
            let mut reuse = None;
            for (pos, &old) in unmatched.iter().enumerate() {
                let old_item = rt.arena.get(old)?.facts.last();
                if old_item.is_some_and(|old_item| (self.same)(old_item, &item)) {
                    reuse = Some(pos);
                    break;
                }
            }
            match reuse {
                Some(pos) => {
                    let old = unmatched.remove(pos);
                    let tuple = rt.arena.get_mut(old)?;
                    let kept = tuple.facts.last().cloned().unwrap_or(item);
                    tuple.facts = with_item(&prefix, kept);
                    self.queue.update(&mut rt.arena, old)?;
                    outputs.insert(old);
                }
                None => {
                    outputs.insert(self.queue.create(&mut rt.arena, with_item(&prefix, item)));
                }
            }
        }
        for old in unmatched {
            self.queue.retract(&mut rt.arena, old)?;
        }
        rt.arena.set_slot(t, self.slot, Slot::Tuples(outputs))
    }

    fn retract(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        for output in rt.arena.take_tuples(t, self.slot)? {
            self.queue.retract(&mut rt.arena, output)?;
        }
        Ok(())
    }

    fn propagate(&mut self, phase: Phase, rt: &mut Runtime<Sc>, out: &mut Vec<Signal>) -> Result<()> {
        self.queue.propagate(phase, &mut rt.arena, out)
    }
}
