use indexmap::IndexSet;

use solverforge_core::Score;

use crate::error::{Result, ScoringError};
use crate::index::{IndexKey, Indexer};
use crate::tuple::{corrupt, Slot, TupleArena, TupleId};

use super::{Input, KeyExtractor, Node, PairPredicate, Runtime, Signal};

pub(crate) struct ExistsSide {
    keys: KeyExtractor,
    index: Box<dyn Indexer>,
    key_slot: usize,
    /// Tuples of the other side this one currently matches.
    matches_slot: usize,
}

impl ExistsSide {
    pub(crate) fn new(keys: KeyExtractor, index: Box<dyn Indexer>, key_slot: usize, matches_slot: usize) -> Self {
        Self {
            keys,
            index,
            key_slot,
            matches_slot,
        }
    }

    fn key_of<Sc>(&self, arena: &TupleArena<Sc>, t: TupleId) -> Result<IndexKey> {
        Ok(self.keys.key(arena.get(t)?.facts()))
    }
}

/// Forwards a left tuple while it has at least one (`if_exists`) or no
/// (`if_not_exists`) matching right tuple.
///
/// Matches are tracked on both sides, so the residual filters run once per
/// candidate pair and a right retract touches only the lefts it counted for.
pub(crate) struct ExistsNode {
    should_exist: bool,
    left: ExistsSide,
    right: ExistsSide,
    filters: Vec<PairPredicate>,
    /// Whether the left tuple is currently forwarded.
    forwarded_slot: usize,
}

impl ExistsNode {
    pub(crate) fn new(
        should_exist: bool,
        left: ExistsSide,
        right: ExistsSide,
        filters: Vec<PairPredicate>,
        forwarded_slot: usize,
    ) -> Self {
        Self {
            should_exist,
            left,
            right,
            filters,
            forwarded_slot,
        }
    }

    fn accepts<Sc>(&self, arena: &TupleArena<Sc>, l: TupleId, r: TupleId) -> Result<bool> {
        if self.filters.is_empty() {
            return Ok(true);
        }
        let (lf, rf) = (arena.get(l)?.facts(), arena.get(r)?.facts());
        Ok(self.filters.iter().all(|f| f(lf, rf)))
    }

    fn link<Sc>(&self, arena: &mut TupleArena<Sc>, l: TupleId, r: TupleId) -> Result<()> {
        arena.tuples_mut(l, self.left.matches_slot)?.insert(r);
        arena.tuples_mut(r, self.right.matches_slot)?.insert(l);
        Ok(())
    }

    fn unlink_from<Sc>(arena: &mut TupleArena<Sc>, holder: TupleId, slot: usize, gone: TupleId) -> Result<()> {
        if arena.tuples_mut(holder, slot)?.swap_remove(&gone) {
            Ok(())
        } else {
            Err(ScoringError::SlotCorruption {
                tuple: holder,
                slot,
                expected: "exists match link",
            })
        }
    }

    /// Re-decides whether `l` is forwarded and emits the transition.
    fn evaluate<Sc>(&self, arena: &mut TupleArena<Sc>, l: TupleId, updated: bool, out: &mut Vec<Signal>) -> Result<()> {
        let count = arena.tuples_len(l, self.left.matches_slot)?;
        let should = (count > 0) == self.should_exist;
        let was = arena.flag(l, self.forwarded_slot)?.unwrap_or(false);
        arena.set_slot(l, self.forwarded_slot, Slot::Flag(should))?;
        match (was, should) {
            (false, true) => out.push(Signal::Insert(l)),
            (true, false) => out.push(Signal::Retract(l)),
            (true, true) if updated => out.push(Signal::Update(l)),
            _ => {}
        }
        Ok(())
    }

    fn index_left<Sc>(&mut self, arena: &mut TupleArena<Sc>, l: TupleId, key: IndexKey) -> Result<()> {
        self.left.index.put(&key, l)?;
        let candidates = self.right.index.matches(&key);
        arena.set_slot(l, self.left.key_slot, Slot::Key(key))?;
        for r in candidates {
            if self.accepts(arena, l, r)? {
                self.link(arena, l, r)?;
            }
        }
        Ok(())
    }

    fn unindex_left<Sc>(&mut self, arena: &mut TupleArena<Sc>, l: TupleId) -> Result<()> {
        let key = arena.take_key(l, self.left.key_slot)?;
        self.left.index.remove(&key, l)?;
        for r in arena.take_tuples(l, self.left.matches_slot)? {
            Self::unlink_from(arena, r, self.right.matches_slot, l)?;
        }
        Ok(())
    }

    /// Returns the lefts whose match set changed.
    fn index_right<Sc>(&mut self, arena: &mut TupleArena<Sc>, r: TupleId, key: IndexKey) -> Result<Vec<TupleId>> {
        self.right.index.put(&key, r)?;
        let candidates = self.left.index.matches(&key);
        arena.set_slot(r, self.right.key_slot, Slot::Key(key))?;
        let mut affected = Vec::new();
        for l in candidates {
            if self.accepts(arena, l, r)? {
                self.link(arena, l, r)?;
                affected.push(l);
            }
        }
        Ok(affected)
    }

    fn unindex_right<Sc>(&mut self, arena: &mut TupleArena<Sc>, r: TupleId) -> Result<Vec<TupleId>> {
        let key = arena.take_key(r, self.right.key_slot)?;
        self.right.index.remove(&key, r)?;
        let lefts = arena.take_tuples(r, self.right.matches_slot)?;
        for &l in &lefts {
            Self::unlink_from(arena, l, self.left.matches_slot, r)?;
        }
        Ok(lefts.into_iter().collect())
    }
}

impl<Sc: Score> Node<Sc> for ExistsNode {
    fn insert(&mut self, input: Input, t: TupleId, rt: &mut Runtime<Sc>, out: &mut Vec<Signal>) -> Result<()> {
        let arena = &mut rt.arena;
        match input {
            Input::Left => {
                let key = self.left.key_of(arena, t)?;
                self.index_left(arena, t, key)?;
                self.evaluate(arena, t, false, out)
            }
            Input::Right => {
                let key = self.right.key_of(arena, t)?;
                for l in self.index_right(arena, t, key)? {
                    self.evaluate(arena, l, false, out)?;
                }
                Ok(())
            }
        }
    }

    fn update(&mut self, input: Input, t: TupleId, rt: &mut Runtime<Sc>, out: &mut Vec<Signal>) -> Result<()> {
        let arena = &mut rt.arena;
        match input {
            Input::Left => {
                let key = self.left.key_of(arena, t)?;
                if arena.key(t, self.left.key_slot)? != &key {
                    self.unindex_left(arena, t)?;
                    self.index_left(arena, t, key)?;
                } else {
                    for r in self.right.index.matches(&key) {
                        let linked = arena.tuples_mut(t, self.left.matches_slot)?.contains(&r);
                        match (linked, self.accepts(arena, t, r)?) {
                            (false, true) => self.link(arena, t, r)?,
                            (true, false) => {
                                Self::unlink_from(arena, t, self.left.matches_slot, r)?;
                                Self::unlink_from(arena, r, self.right.matches_slot, t)?;
                            }
                            _ => {}
                        }
                    }
                }
                self.evaluate(arena, t, true, out)
            }
            Input::Right => {
                let key = self.right.key_of(arena, t)?;
                let mut affected = IndexSet::new();
                if arena.key(t, self.right.key_slot)? != &key {
                    affected.extend(self.unindex_right(arena, t)?);
                    affected.extend(self.index_right(arena, t, key)?);
                } else {
                    for l in self.left.index.matches(&key) {
                        let linked = arena.tuples_mut(t, self.right.matches_slot)?.contains(&l);
                        match (linked, self.accepts(arena, l, t)?) {
                            (false, true) => {
                                self.link(arena, l, t)?;
                                affected.insert(l);
                            }
                            (true, false) => {
                                Self::unlink_from(arena, t, self.right.matches_slot, l)?;
                                Self::unlink_from(arena, l, self.left.matches_slot, t)?;
                                affected.insert(l);
                            }
                            _ => {}
                        }
                    }
                }
                for l in affected {
                    self.evaluate(arena, l, false, out)?;
                }
                Ok(())
            }
        }
    }

    fn retract(&mut self, input: Input, t: TupleId, rt: &mut Runtime<Sc>, out: &mut Vec<Signal>) -> Result<()> {
        let arena = &mut rt.arena;
        match input {
            Input::Left => {
                self.unindex_left(arena, t)?;
                match arena.take_slot(t, self.forwarded_slot)? {
                    Slot::Flag(true) => out.push(Signal::Retract(t)),
                    Slot::Flag(false) => {}
                    _ => return Err(corrupt(t, self.forwarded_slot, "exists verdict")),
                }
                Ok(())
            }
            Input::Right => {
                for l in self.unindex_right(arena, t)? {
                    self.evaluate(arena, l, false, out)?;
                }
                Ok(())
            }
        }
    }
}
