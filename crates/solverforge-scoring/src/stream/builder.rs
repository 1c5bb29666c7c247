// Terminal step of a stream: weight, match weight and name.

use std::marker::PhantomData;
use std::sync::Arc;

use solverforge_core::{ConstraintRef, ImpactType, Score};

use crate::node::WeightFn;

use super::def::{Constraint, StreamDef};
use super::operand::Operand;

/// Returned by `penalize`/`reward`; finished with [`as_constraint`](Self::as_constraint).
///
/// `L` is the tuple of fact types the stream carries, which fixes the
/// signature `with_match_weight` accepts.
pub struct ConstraintBuilder<Sc: Score, L> {
    stream: Arc<StreamDef>,
    package: Arc<str>,
    weight: Sc,
    impact: ImpactType,
    match_weight: Option<Operand<WeightFn>>,
    _phantom: PhantomData<fn() -> L>,
}

impl<Sc: Score, L> ConstraintBuilder<Sc, L> {
    pub(crate) fn new(stream: Arc<StreamDef>, package: Arc<str>, weight: Sc, impact: ImpactType) -> Self {
        Self {
            stream,
            package,
            weight,
            impact,
            match_weight: None,
            _phantom: PhantomData,
        }
    }

    pub(crate) fn set_match_weight(mut self, match_weight: Operand<WeightFn>) -> Self {
        self.match_weight = Some(match_weight);
        self
    }

    /// Names the constraint within the factory's package.
    pub fn as_constraint(self, name: impl Into<String>) -> Constraint<Sc> {
        Constraint {
            constraint: ConstraintRef::new(&*self.package, name),
            weight: self.weight,
            impact: self.impact,
            match_weight: self.match_weight,
            stream: self.stream,
        }
    }
}
