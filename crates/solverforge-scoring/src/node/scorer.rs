use solverforge_core::{ImpactType, Score};

use crate::error::Result;
use crate::tuple::{Slot, TupleId};

use super::{Input, Node, Runtime, Signal, WeightFn};

/// Terminal node: turns every tuple reaching it into a score impact.
pub(crate) struct ScorerNode<Sc: Score> {
    constraint: usize,
    weight: Sc,
    impact: ImpactType,
    match_weight: Option<WeightFn>,
    slot: usize,
}

impl<Sc: Score> ScorerNode<Sc> {
    pub(crate) fn new(
        constraint: usize,
        weight: Sc,
        impact: ImpactType,
        match_weight: Option<WeightFn>,
        slot: usize,
    ) -> Self {
        Self {
            constraint,
            weight,
            impact,
            match_weight,
            slot,
        }
    }

    fn score(&self, rt: &mut Runtime<Sc>, t: TupleId) -> Result<()> {
        let tuple = rt.arena.get(t)?;
        let match_weight = self.match_weight.as_ref().map_or(1, |w| w(tuple.facts()));
        let delta = self.impact.apply(self.weight, match_weight);
        let undo = rt.inliner.impact(self.constraint, delta, &tuple.facts);
        rt.arena.set_slot(t, self.slot, Slot::Impact(undo))
    }
}

impl<Sc: Score> Node<Sc> for ScorerNode<Sc> {
    fn insert(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        self.score(rt, t)
    }

    fn update(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let undo = rt.arena.take_impact(t, self.slot)?;
        rt.inliner.undo(undo);
        self.score(rt, t)
    }

    fn retract(&mut self, _: Input, t: TupleId, rt: &mut Runtime<Sc>, _: &mut Vec<Signal>) -> Result<()> {
        let undo = rt.arena.take_impact(t, self.slot)?;
        rt.inliner.undo(undo);
        Ok(())
    }
}
