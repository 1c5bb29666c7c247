//! Tuples: the unit of propagation through the node network.
//!
//! Tuples live in a generational [`TupleArena`] and are addressed by
//! [`TupleId`]. A released id is never resolved again, so a node holding a
//! stale id gets [`ScoringError::StaleTuple`](crate::ScoringError::StaleTuple)
//! instead of someone else's tuple.

mod arena;
mod slot;


use smallvec::SmallVec;

use crate::fact::{FactRef, Facts};

pub(crate) use arena::{corrupt, TupleArena};
pub(crate) use slot::Slot;

/// Generational index of a tuple in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TupleId {
    index: u32,
    generation: u32,
}

impl TupleId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

/// Lifecycle of a tuple as seen by the node that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TupleState {
    /// Created during this settle; not yet visible downstream.
    Created,
    /// Propagated and settled.
    Ok,
    /// Visible downstream; its facts changed and an update is pending.
    DirtyUpdate,
    /// Visible downstream; a retract is pending.
    DirtyRetract,
    /// Created and retracted within the same settle; never propagated.
    Aborted,
    /// Fully retracted; the arena entry is about to be released.
    Dead,
}

impl TupleState {
    /// True while children of the producing node hold state for the tuple.
    pub fn is_visible(self) -> bool {
        matches!(
            self,
            TupleState::Ok | TupleState::DirtyUpdate | TupleState::DirtyRetract
        )
    }

    pub fn is_dirty(self) -> bool {
        matches!(
            self,
            TupleState::Created | TupleState::DirtyUpdate | TupleState::DirtyRetract
        )
    }
}

pub(crate) type FactVec = SmallVec<[FactRef; 4]>;

/// Facts plus the store slots reserved for every node that reads this tuple.
pub(crate) struct Tuple<Sc> {
    pub(crate) facts: FactVec,
    pub(crate) store: Box<[Slot<Sc>]>,
    pub(crate) state: TupleState,
}

impl<Sc> Tuple<Sc> {
    pub(crate) fn new(facts: FactVec, store_size: usize) -> Self {
        let store = (0..store_size).map(|_| Slot::Empty).collect();
        Self {
            facts,
            store,
            state: TupleState::Created,
        }
    }

    pub(crate) fn facts(&self) -> Facts<'_> {
        Facts::new(&self.facts)
    }
}
