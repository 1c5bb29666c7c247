use solverforge_core::Score;

use crate::error::{Result, ScoringError};
use crate::index::{IndexKey, Indexer};
use crate::tuple::{FactVec, Slot, TupleArena, TupleId};

use super::{Input, KeyExtractor, Node, PairPredicate, Phase, PropagationQueue, Runtime, Signal};

/// One input of a join: its key extractors, its index and the slots it
/// reserved on incoming tuples.
pub(crate) struct JoinSide {
    keys: KeyExtractor,
    index: Box<dyn Indexer>,
    key_slot: usize,
    pairs_slot: usize,
}

impl JoinSide {
    pub(crate) fn new(keys: KeyExtractor, index: Box<dyn Indexer>, key_slot: usize, pairs_slot: usize) -> Self {
        Self {
            keys,
            index,
            key_slot,
            pairs_slot,
        }
    }

    fn key_of<Sc>(&self, arena: &TupleArena<Sc>, t: TupleId) -> Result<IndexKey> {
        Ok(self.keys.key(arena.get(t)?.facts()))
    }
}

/// Materializes a combined tuple for every matching (left, right) pair.
///
/// Each input tuple keeps a partner-to-output map in its pairs slot, so a
/// retract on either side finds its outputs without another lookup, and an
/// update with an unchanged key keeps the identity of surviving outputs.
pub(crate) struct JoinNode {
    left: JoinSide,
    right: JoinSide,
    filters: Vec<PairPredicate>,
    queue: PropagationQueue,
}

/// Which side is acting, so pair facts and filters stay left-then-right.
struct Pairing<'a> {
    filters: &'a [PairPredicate],
    acting_left: bool,
}

impl Pairing<'_> {
    fn ordered(&self, acting: TupleId, partner: TupleId) -> (TupleId, TupleId) {
        if self.acting_left {
            (acting, partner)
        } else {
            (partner, acting)
        }
    }

    fn accepts<Sc>(&self, arena: &TupleArena<Sc>, acting: TupleId, partner: TupleId) -> Result<bool> {
        if self.filters.is_empty() {
            return Ok(true);
        }
        let (l, r) = self.ordered(acting, partner);
        let (l, r) = (arena.get(l)?.facts(), arena.get(r)?.facts());
        Ok(self.filters.iter().all(|f| f(l, r)))
    }

    fn combined<Sc>(&self, arena: &TupleArena<Sc>, acting: TupleId, partner: TupleId) -> Result<FactVec> {
        let (l, r) = self.ordered(acting, partner);
        let mut facts = arena.get(l)?.facts.clone();
        facts.extend(arena.get(r)?.facts.iter().cloned());
        Ok(facts)
    }
}

impl JoinNode {
    pub(crate) fn new(left: JoinSide, right: JoinSide, filters: Vec<PairPredicate>, store_size: usize) -> Self {
        Self {
            left,
            right,
            filters,
            queue: PropagationQueue::new(store_size),
        }
    }

    fn split(&mut self, input: Input) -> (&mut JoinSide, &JoinSide, Pairing<'_>, &mut PropagationQueue) {
        let JoinNode {
            left,
            right,
            filters,
            queue,
        } = self;
        match input {
            Input::Left => (
                left,
                &*right,
                Pairing {
                    filters: filters.as_slice(),
                    acting_left: true,
                },
                queue,
            ),
            Input::Right => (
                right,
                &*left,
                Pairing {
                    filters: filters.as_slice(),
                    acting_left: false,
                },
                queue,
            ),
        }
    }
}

fn pair<Sc>(
    this: &JoinSide,
    other: &JoinSide,
    pairing: &Pairing<'_>,
    queue: &mut PropagationQueue,
    arena: &mut TupleArena<Sc>,
    t: TupleId,
    partner: TupleId,
) -> Result<()> {
    let facts = pairing.combined(arena, t, partner)?;
    let out = queue.create(arena, facts);
    arena.pairs_mut(t, this.pairs_slot)?.insert(partner, out);
    arena.pairs_mut(partner, other.pairs_slot)?.insert(t, out);
    Ok(())
}

fn unlink<Sc>(arena: &mut TupleArena<Sc>, partner: TupleId, slot: usize, t: TupleId) -> Result<()> {
    match arena.pairs_mut(partner, slot)?.swap_remove(&t) {
        Some(_) => Ok(()),
        None => Err(ScoringError::SlotCorruption {
            tuple: partner,
            slot,
            expected: "join partner link",
        }),
    }
}

fn attach<Sc>(
    this: &mut JoinSide,
    other: &JoinSide,
    pairing: &Pairing<'_>,
    queue: &mut PropagationQueue,
    arena: &mut TupleArena<Sc>,
    t: TupleId,
    key: IndexKey,
) -> Result<()> {
    this.index.put(&key, t)?;
    let partners = other.index.matches(&key);
    arena.set_slot(t, this.key_slot, Slot::Key(key))?;
    for partner in partners {
        if pairing.accepts(arena, t, partner)? {
            pair(this, other, pairing, queue, arena, t, partner)?;
        }
    }
    Ok(())
}

fn detach<Sc>(
    this: &mut JoinSide,
    other: &JoinSide,
    queue: &mut PropagationQueue,
    arena: &mut TupleArena<Sc>,
    t: TupleId,
) -> Result<()> {
    let key = arena.take_key(t, this.key_slot)?;
    this.index.remove(&key, t)?;
    for (partner, out) in arena.take_pairs(t, this.pairs_slot)? {
        unlink(arena, partner, other.pairs_slot, t)?;
        queue.retract(arena, out)?;
    }
    Ok(())
}

impl<Sc: Score> Node<Sc> for JoinNode {
    fn insert(&mut self, input: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let (this, other, pairing, queue) = self.split(input);
        let key = this.key_of(&rt.arena, t)?;
        attach(this, other, &pairing, queue, &mut rt.arena, t, key)
    }

    fn update(&mut self, input: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let (this, other, pairing, queue) = self.split(input);
        let arena = &mut rt.arena;
        let key = this.key_of(arena, t)?;
        if arena.key(t, this.key_slot)? != &key {
            detach(this, other, queue, arena, t)?;
            return attach(this, other, &pairing, queue, arena, t, key);
        }

        for partner in other.index.matches(&key) {
            let existing = arena.pairs_mut(t, this.pairs_slot)?.get(&partner).copied();
            let accepted = pairing.accepts(arena, t, partner)?;
            match (existing, accepted) {
                (Some(out), true) => {
                    let facts = pairing.combined(arena, t, partner)?;
                    arena.get_mut(out)?.facts = facts;
                    queue.update(arena, out)?;
                }
                (Some(out), false) => {
                    arena.pairs_mut(t, this.pairs_slot)?.swap_remove(&partner);
                    unlink(arena, partner, other.pairs_slot, t)?;
                    queue.retract(arena, out)?;
                }
                (None, true) => pair(this, other, &pairing, queue, arena, t, partner)?,
                (None, false) => {}
            }
        }
        Ok(())
    }

    fn retract(&mut self, input: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let (this, other, _, queue) = self.split(input);
        detach(this, other, queue, &mut rt.arena, t)
    }

    fn propagate(&mut self, phase: Phase, rt: &mut Runtime<Sc>, out: &mut Vec<Signal>) -> Result<()> {
        self.queue.propagate(phase, &mut rt.arena, out)
    }
}
