use indexmap::{IndexMap, IndexSet};

use crate::error::{Result, ScoringError};
use crate::index::IndexKey;
use crate::session::UndoScoreImpacter;

use super::{FactVec, Slot, Tuple, TupleId};

struct Entry<Sc> {
    generation: u32,
    tuple: Option<Tuple<Sc>>,
}

/// Generational storage for every live tuple of one session.
pub(crate) struct TupleArena<Sc> {
    entries: Vec<Entry<Sc>>,
    free: Vec<u32>,
    live: usize,
}

impl<Sc> Default for TupleArena<Sc> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }
}

impl<Sc> TupleArena<Sc> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocates a tuple in state `Created`.
    pub(crate) fn create(&mut self, facts: FactVec, store_size: usize) -> TupleId {
        let tuple = Tuple::new(facts, store_size);
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index as usize];
                entry.tuple = Some(tuple);
                TupleId::new(index, entry.generation)
            }
            None => {
                let index = self.entries.len() as u32;
                self.entries.push(Entry {
                    generation: 0,
                    tuple: Some(tuple),
                });
                TupleId::new(index, 0)
            }
        }
    }

    /// Frees the entry; the id and every copy of it become stale.
    pub(crate) fn release(&mut self, id: TupleId) -> Result<()> {
        let entry = self
            .entries
            .get_mut(id.index())
            .filter(|e| e.generation == id.generation() && e.tuple.is_some())
            .ok_or(ScoringError::StaleTuple(id))?;
        entry.tuple = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index() as u32);
        self.live -= 1;
        Ok(())
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live
    }

    pub(crate) fn get(&self, id: TupleId) -> Result<&Tuple<Sc>> {
        self.entries
            .get(id.index())
            .filter(|e| e.generation == id.generation())
            .and_then(|e| e.tuple.as_ref())
            .ok_or(ScoringError::StaleTuple(id))
    }

    pub(crate) fn get_mut(&mut self, id: TupleId) -> Result<&mut Tuple<Sc>> {
        self.entries
            .get_mut(id.index())
            .filter(|e| e.generation == id.generation())
            .and_then(|e| e.tuple.as_mut())
            .ok_or(ScoringError::StaleTuple(id))
    }

    pub(crate) fn slot(&self, id: TupleId, slot: usize) -> Result<&Slot<Sc>> {
        self.get(id)?
            .store
            .get(slot)
            .ok_or(ScoringError::SlotCorruption {
                tuple: id,
                slot,
                expected: "reserved slot",
            })
    }

    pub(crate) fn slot_mut(&mut self, id: TupleId, slot: usize) -> Result<&mut Slot<Sc>> {
        self.get_mut(id)?
            .store
            .get_mut(slot)
            .ok_or(ScoringError::SlotCorruption {
                tuple: id,
                slot,
                expected: "reserved slot",
            })
    }

    pub(crate) fn set_slot(&mut self, id: TupleId, slot: usize, value: Slot<Sc>) -> Result<()> {
        *self.slot_mut(id, slot)? = value;
        Ok(())
    }

    /// Empties the slot and returns what it held.
    pub(crate) fn take_slot(&mut self, id: TupleId, slot: usize) -> Result<Slot<Sc>> {
        Ok(std::mem::replace(self.slot_mut(id, slot)?, Slot::Empty))
    }

    pub(crate) fn flag(&self, id: TupleId, slot: usize) -> Result<Option<bool>> {
        match self.slot(id, slot)? {
            Slot::Empty => Ok(None),
            Slot::Flag(b) => Ok(Some(*b)),
            _ => Err(corrupt(id, slot, "flag")),
        }
    }

    pub(crate) fn key(&self, id: TupleId, slot: usize) -> Result<&IndexKey> {
        match self.slot(id, slot)? {
            Slot::Key(k) => Ok(k),
            _ => Err(corrupt(id, slot, "key")),
        }
    }

    pub(crate) fn take_key(&mut self, id: TupleId, slot: usize) -> Result<IndexKey> {
        match self.take_slot(id, slot)? {
            Slot::Key(k) => Ok(k),
            _ => Err(corrupt(id, slot, "key")),
        }
    }

    pub(crate) fn take_tuple(&mut self, id: TupleId, slot: usize) -> Result<Option<TupleId>> {
        match self.take_slot(id, slot)? {
            Slot::Empty => Ok(None),
            Slot::Tuple(t) => Ok(Some(t)),
            _ => Err(corrupt(id, slot, "tuple")),
        }
    }

    pub(crate) fn tuple_ref(&self, id: TupleId, slot: usize) -> Result<Option<TupleId>> {
        match self.slot(id, slot)? {
            Slot::Empty => Ok(None),
            Slot::Tuple(t) => Ok(Some(*t)),
            _ => Err(corrupt(id, slot, "tuple")),
        }
    }

    /// Set slot, created on first use.
    pub(crate) fn tuples_mut(&mut self, id: TupleId, slot: usize) -> Result<&mut IndexSet<TupleId>> {
        let s = self.slot_mut(id, slot)?;
        if s.is_empty() {
            *s = Slot::Tuples(IndexSet::new());
        }
        match s {
            Slot::Tuples(set) => Ok(set),
            _ => Err(corrupt(id, slot, "tuples")),
        }
    }

    pub(crate) fn tuples_len(&self, id: TupleId, slot: usize) -> Result<usize> {
        match self.slot(id, slot)? {
            Slot::Empty => Ok(0),
            Slot::Tuples(set) => Ok(set.len()),
            _ => Err(corrupt(id, slot, "tuples")),
        }
    }

    pub(crate) fn take_tuples(&mut self, id: TupleId, slot: usize) -> Result<IndexSet<TupleId>> {
        match self.take_slot(id, slot)? {
            Slot::Empty => Ok(IndexSet::new()),
            Slot::Tuples(set) => Ok(set),
            _ => Err(corrupt(id, slot, "tuples")),
        }
    }

    /// Pair map slot, created on first use.
    pub(crate) fn pairs_mut(
        &mut self,
        id: TupleId,
        slot: usize,
    ) -> Result<&mut IndexMap<TupleId, TupleId>> {
        let s = self.slot_mut(id, slot)?;
        if s.is_empty() {
            *s = Slot::Pairs(IndexMap::new());
        }
        match s {
            Slot::Pairs(map) => Ok(map),
            _ => Err(corrupt(id, slot, "pairs")),
        }
    }

    pub(crate) fn take_pairs(
        &mut self,
        id: TupleId,
        slot: usize,
    ) -> Result<IndexMap<TupleId, TupleId>> {
        match self.take_slot(id, slot)? {
            Slot::Empty => Ok(IndexMap::new()),
            Slot::Pairs(map) => Ok(map),
            _ => Err(corrupt(id, slot, "pairs")),
        }
    }

    pub(crate) fn take_token(
        &mut self,
        id: TupleId,
        slot: usize,
    ) -> Result<Box<dyn std::any::Any + Send>> {
        match self.take_slot(id, slot)? {
            Slot::Token(token) => Ok(token),
            _ => Err(corrupt(id, slot, "token")),
        }
    }

    pub(crate) fn take_impact(&mut self, id: TupleId, slot: usize) -> Result<UndoScoreImpacter<Sc>> {
        match self.take_slot(id, slot)? {
            Slot::Impact(undo) => Ok(undo),
            Slot::Empty => Err(ScoringError::MissingUndo(id)),
            _ => Err(corrupt(id, slot, "impact")),
        }
    }
}

pub(crate) fn corrupt(tuple: TupleId, slot: usize, expected: &'static str) -> ScoringError {
    ScoringError::SlotCorruption {
        tuple,
        slot,
        expected,
    }
}
