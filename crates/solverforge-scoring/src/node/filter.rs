use solverforge_core::Score;

use crate::error::Result;
use crate::tuple::{corrupt, Slot, TupleId};

use super::{Input, Node, Predicate, Runtime, Signal};

/// Forwards tuples while the predicate holds.
///
/// The last verdict is kept in a slot so an update can be translated into an
/// insert (fail to pass) or a retract (pass to fail).
pub(crate) struct FilterNode {
    predicate: Predicate,
    slot: usize,
}

impl FilterNode {
    pub(crate) fn new(predicate: Predicate, slot: usize) -> Self {
        Self { predicate, slot }
    }

    fn test<Sc: Score>(&self, rt: &Runtime<Sc>, t: TupleId) -> Result<bool> {
        Ok((self.predicate)(rt.arena.get(t)?.facts()))
    }
}

impl<Sc: Score> Node<Sc> for FilterNode {
    fn insert(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, out: &mut Vec<Signal>) -> Result<()> {
        let pass = self.test(rt, t)?;
        rt.arena.set_slot(t, self.slot, Slot::Flag(pass))?;
        if pass {
            out.push(Signal::Insert(t));
        }
        Ok(())
    }

    fn update(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, out: &mut Vec<Signal>) -> Result<()> {
        let was = rt
            .arena
            .flag(t, self.slot)?
            .ok_or_else(|| corrupt(t, self.slot, "filter verdict"))?;
        let pass = self.test(rt, t)?;
        rt.arena.set_slot(t, self.slot, Slot::Flag(pass))?;
        match (was, pass) {
            (true, true) => out.push(Signal::Update(t)),
            (false, true) => out.push(Signal::Insert(t)),
            (true, false) => out.push(Signal::Retract(t)),
            (false, false) => {}
        }
        Ok(())
    }

    fn retract(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, out: &mut Vec<Signal>) -> Result<()> {
        match rt.arena.take_slot(t, self.slot)? {
            Slot::Flag(true) => out.push(Signal::Retract(t)),
            Slot::Flag(false) => {}
            _ => return Err(corrupt(t, self.slot, "filter verdict")),
        }
        Ok(())
    }
}
