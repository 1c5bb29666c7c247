use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use solverforge_core::Score;

use crate::error::{Result, ScoringError};
use crate::index::IndexKey;
use crate::stream::collector::{ErasedAccumulator, ErasedCollector};
use crate::tuple::{corrupt, FactVec, Slot, TupleArena, TupleId, TupleState};

use super::{compute_key, Input, KeyFn, Node, Phase, PropagationQueue, Runtime, Signal};

struct Group {
    out: TupleId,
    key_facts: FactVec,
    acc: Option<Box<dyn ErasedAccumulator>>,
    members: usize,
}

impl Group {
    fn facts(&self) -> FactVec {
        let mut facts = self.key_facts.clone();
        facts.extend(self.acc.as_ref().map(|acc| acc.result()));
        facts
    }
}

/// Partitions its input by its keys and emits one tuple per non-empty
/// group: the key values, then the collector's result if there is one.
/// Without keys every tuple falls into one global group.
///
/// Results are recomputed once per settle, right before the update phase,
/// for every group whose membership changed.
pub(crate) struct GroupNode {
    keys: Vec<KeyFn>,
    collector: Option<Arc<dyn ErasedCollector>>,
    key_slot: usize,
    token_slot: usize,
    groups: HashMap<IndexKey, Group>,
    out_keys: HashMap<TupleId, IndexKey>,
    queue: PropagationQueue,
}

impl GroupNode {
    pub(crate) fn new(
        keys: Vec<KeyFn>,
        collector: Option<Arc<dyn ErasedCollector>>,
        key_slot: usize,
        token_slot: usize,
        store_size: usize,
    ) -> Self {
        Self {
            keys,
            collector,
            key_slot,
            token_slot,
            groups: HashMap::new(),
            out_keys: HashMap::new(),
            queue: PropagationQueue::new(store_size),
        }
    }

    fn key_of<Sc>(&self, arena: &TupleArena<Sc>, t: TupleId) -> Result<IndexKey> {
        Ok(compute_key(&self.keys, arena.get(t)?.facts()))
    }

    fn add<Sc>(&mut self, arena: &mut TupleArena<Sc>, t: TupleId, key: IndexKey) -> Result<()> {
        if let Some(group) = self.groups.get(&key) {
            if group.acc.is_some() {
                self.queue.update(arena, group.out)?;
            }
        } else {
            let out = self.queue.create(arena, SmallVec::new());
            self.out_keys.insert(out, key.clone());
            self.groups.insert(
                key.clone(),
                Group {
                    out,
                    key_facts: key.parts().map(|part| part.to_fact()).collect(),
                    acc: self.collector.as_ref().map(|c| c.create()),
                    members: 0,
                },
            );
        }
        let group = self
            .groups
            .get_mut(&key)
            .ok_or_else(|| ScoringError::IndexCorruption {
                tuple: t,
                key: format!("{:?}", key),
            })?;
        group.members += 1;
        if let Some(acc) = group.acc.as_mut() {
            let token = acc.accumulate(arena.get(t)?.facts());
            arena.set_slot(t, self.token_slot, Slot::Token(token))?;
        }
        arena.set_slot(t, self.key_slot, Slot::Key(key))
    }

    fn remove<Sc>(&mut self, arena: &mut TupleArena<Sc>, t: TupleId) -> Result<()> {
        let key = arena.take_key(t, self.key_slot)?;
        let group = self
            .groups
            .get_mut(&key)
            .ok_or_else(|| ScoringError::IndexCorruption {
                tuple: t,
                key: format!("{:?}", key),
            })?;
        if let Some(acc) = group.acc.as_mut() {
            let token = arena.take_token(t, self.token_slot)?;
            if !acc.retract(token) {
                return Err(corrupt(t, self.token_slot, "collector token"));
            }
        }
        group.members -= 1;
        let out = group.out;
        if group.members == 0 {
            self.groups.remove(&key);
            self.out_keys.remove(&out);
            self.queue.retract(arena, out)
        } else if group.acc.is_some() {
            self.queue.update(arena, out)
        } else {
            Ok(())
        }
    }

    /// Rewrites the facts of every group output still waiting to be emitted.
    fn refresh<Sc>(&self, arena: &mut TupleArena<Sc>) -> Result<()> {
        for &out in self.queue.pending() {
            let tuple = arena.get_mut(out)?;
            if !matches!(tuple.state, TupleState::Created | TupleState::DirtyUpdate) {
                continue;
            }
            let group = self
                .out_keys
                .get(&out)
                .and_then(|key| self.groups.get(key))
                .ok_or(ScoringError::StaleTuple(out))?;
            tuple.facts = group.facts();
        }
        Ok(())
    }
}

impl<Sc: Score> Node<Sc> for GroupNode {
    fn insert(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let key = self.key_of(&rt.arena, t)?;
        self.add(&mut rt.arena, t, key)
    }

    fn update(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let arena = &mut rt.arena;
        let key = self.key_of(arena, t)?;
        if arena.key(t, self.key_slot)? != &key {
            self.remove(arena, t)?;
            return self.add(arena, t, key);
        }
        let Some(group) = self.groups.get_mut(&key) else {
            return Err(ScoringError::IndexCorruption {
                tuple: t,
                key: format!("{:?}", key),
            });
        };
        if let Some(acc) = group.acc.as_mut() {
            let token = arena.take_token(t, self.token_slot)?;
            if !acc.retract(token) {
                return Err(corrupt(t, self.token_slot, "collector token"));
            }
            let token = acc.accumulate(arena.get(t)?.facts());
            arena.set_slot(t, self.token_slot, Slot::Token(token))?;
            self.queue.update(arena, group.out)?;
        }
        Ok(())
    }

    fn retract(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        self.remove(&mut rt.arena, t)
    }

    fn propagate(&mut self, phase: Phase, rt: &mut Runtime<Sc>, out: &mut Vec<Signal>) -> Result<()> {
        if phase == Phase::Update {
            self.refresh(&mut rt.arena)?;
        }
        self.queue.propagate(phase, &mut rt.arena, out)
    }
}
