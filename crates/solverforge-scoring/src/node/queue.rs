use crate::error::{Result, ScoringError};
use crate::tuple::{FactVec, TupleArena, TupleId, TupleState};

use super::{Phase, Signal};

/// Dirty list of a producer node's output tuples.
///
/// The lifecycle state lives on the tuple itself; the queue only remembers
/// which tuples changed since the last propagation, each at most once.
pub(crate) struct PropagationQueue {
    dirty: Vec<TupleId>,
    store_size: usize,
}

impl PropagationQueue {
    pub(crate) fn new(store_size: usize) -> Self {
        Self {
            dirty: Vec::new(),
            store_size,
        }
    }

    /// Allocates an output tuple in state `Created`.
    pub(crate) fn create<Sc>(&mut self, arena: &mut TupleArena<Sc>, facts: FactVec) -> TupleId {
        let id = arena.create(facts, self.store_size);
        self.dirty.push(id);
        id
    }

    pub(crate) fn update<Sc>(&mut self, arena: &mut TupleArena<Sc>, id: TupleId) -> Result<()> {
        let tuple = arena.get_mut(id)?;
        match tuple.state {
            TupleState::Ok => {
                tuple.state = TupleState::DirtyUpdate;
                self.dirty.push(id);
            }
            TupleState::Created | TupleState::DirtyUpdate => {}
            state => {
                return Err(ScoringError::ImpossibleState {
                    tuple: id,
                    state,
                    action: "update",
                })
            }
        }
        Ok(())
    }

    pub(crate) fn retract<Sc>(&mut self, arena: &mut TupleArena<Sc>, id: TupleId) -> Result<()> {
        let tuple = arena.get_mut(id)?;
        match tuple.state {
            TupleState::Created => tuple.state = TupleState::Aborted,
            TupleState::DirtyUpdate => tuple.state = TupleState::DirtyRetract,
            TupleState::Ok => {
                tuple.state = TupleState::DirtyRetract;
                self.dirty.push(id);
            }
            state => {
                return Err(ScoringError::ImpossibleState {
                    tuple: id,
                    state,
                    action: "retract",
                })
            }
        }
        Ok(())
    }

    /// Tuples still waiting for the update or insert phase.
    pub(crate) fn pending(&self) -> &[TupleId] {
        &self.dirty
    }

    /// Moves tuples of the given phase to their settled state and emits the
    /// matching signals.
    ///
    /// Retracted tuples become `Dead`; the caller releases them once the
    /// children have seen the retract. Aborted tuples were never visible and
    /// are released here.
    pub(crate) fn propagate<Sc>(
        &mut self,
        phase: Phase,
        arena: &mut TupleArena<Sc>,
        out: &mut Vec<Signal>,
    ) -> Result<()> {
        match phase {
            Phase::Retract => {
                let mut remaining = Vec::with_capacity(self.dirty.len());
                for id in std::mem::take(&mut self.dirty) {
                    let state = arena.get(id)?.state;
                    match state {
                        TupleState::DirtyRetract => {
                            arena.get_mut(id)?.state = TupleState::Dead;
                            out.push(Signal::Retract(id));
                        }
                        TupleState::Aborted => arena.release(id)?,
                        _ => remaining.push(id),
                    }
                }
                self.dirty = remaining;
            }
            Phase::Update => {
                for &id in &self.dirty {
                    let tuple = arena.get_mut(id)?;
                    if tuple.state == TupleState::DirtyUpdate {
                        tuple.state = TupleState::Ok;
                        out.push(Signal::Update(id));
                    }
                }
            }
            Phase::Insert => {
                for id in std::mem::take(&mut self.dirty) {
                    let tuple = arena.get_mut(id)?;
                    if tuple.state == TupleState::Created {
                        tuple.state = TupleState::Ok;
                        out.push(Signal::Insert(id));
                    }
                }
            }
        }
        Ok(())
    }
}
