//! Untyped stream definitions, the input of the network compiler.

use std::any::TypeId;
use std::sync::Arc;

use solverforge_core::{ConstraintRef, ImpactType, Score};

use crate::fact::Facts;
use crate::index::{Comparison, RangeValue};
use crate::node::{FlattenFn, KeyFn, Mapper, PairPredicate, Predicate, RangeFn, SameFn, WeightFn};

use super::collector::ErasedCollector;
use super::operand::{FnIdentity, Operand};

pub(crate) enum StreamDef {
    Source {
        fact_type: TypeId,
        type_name: &'static str,
    },
    Filter {
        parent: Arc<StreamDef>,
        predicate: Operand<Predicate>,
    },
    Join {
        left: Arc<StreamDef>,
        right: Arc<StreamDef>,
        joiner: JoinerDef,
    },
    Exists {
        left: Arc<StreamDef>,
        right: Arc<StreamDef>,
        joiner: JoinerDef,
        should_exist: bool,
    },
    Map {
        parent: Arc<StreamDef>,
        mappers: Vec<Operand<Mapper>>,
    },
    FlattenLast {
        parent: Arc<StreamDef>,
        flatten: Operand<FlattenFn>,
        same: SameFn,
    },
    Concat {
        left: Arc<StreamDef>,
        right: Arc<StreamDef>,
    },
    /// No keys groups everything together.
    Group {
        parent: Arc<StreamDef>,
        keys: Vec<Operand<KeyFn>>,
        collector: Option<Operand<Arc<dyn ErasedCollector>>>,
    },
}

/// A joiner lowered into equality keys, at most one indexed comparison
/// and residual pair filters.
///
/// `left_keys[i]` is compared with `right_keys[i]`. The keys and the range
/// take part in indexing; the filters run on indexed candidates only.
#[doc(hidden)]
#[derive(Clone, Default)]
pub struct JoinerDef {
    pub(crate) left_keys: Vec<Operand<KeyFn>>,
    pub(crate) right_keys: Vec<Operand<KeyFn>>,
    pub(crate) range: Option<RangeDef>,
    pub(crate) filters: Vec<Operand<PairPredicate>>,
}

/// An ordered comparison between a value of the left tuple and one of the
/// right fact. A pair matches when `left <op> right` holds.
#[derive(Clone)]
pub(crate) struct RangeDef {
    pub(crate) left: Operand<RangeFn>,
    pub(crate) right: Operand<RangeFn>,
    pub(crate) op: Comparison,
}

impl RangeDef {
    pub(crate) fn holds(&self, l: Facts<'_>, r: Facts<'_>) -> bool {
        let (left, right) = ((self.left.f)(l), (self.right.f)(r));
        self.op.holds((*left).cmp_value(&*right))
    }

    fn identity(&self) -> FnIdentity {
        FnIdentity::Composite(self.op.tag(), vec![self.left.id.clone(), self.right.id.clone()])
    }

    /// The same comparison, checked pair by pair.
    fn into_filter(self) -> Operand<PairPredicate> {
        let id = self.identity();
        let f: PairPredicate = Arc::new(move |l: Facts<'_>, r: Facts<'_>| self.holds(l, r));
        Operand { id, f }
    }
}

impl JoinerDef {
    /// Only the first comparison is indexed; later ones become filters.
    pub(crate) fn and(mut self, other: JoinerDef) -> JoinerDef {
        self.left_keys.extend(other.left_keys);
        self.right_keys.extend(other.right_keys);
        match (self.range.take(), other.range) {
            (Some(first), Some(second)) => {
                self.range = Some(first);
                self.filters.push(second.into_filter());
            }
            (first, second) => self.range = first.or(second),
        }
        self.filters.extend(other.filters);
        self
    }

    pub(crate) fn identity(&self) -> Vec<FnIdentity> {
        vec![
            FnIdentity::Composite("left_keys", ids(&self.left_keys)),
            FnIdentity::Composite("right_keys", ids(&self.right_keys)),
            self.range
                .as_ref()
                .map_or(FnIdentity::tag("no_range"), RangeDef::identity),
            FnIdentity::Composite("filters", ids(&self.filters)),
        ]
    }
}

fn ids<F>(ops: &[Operand<F>]) -> Vec<FnIdentity> {
    ops.iter().map(|op| op.id.clone()).collect()
}

/// A finished constraint: a stream, its weight and impact direction.
///
/// Produced by [`ConstraintBuilder::as_constraint`](super::ConstraintBuilder::as_constraint)
/// and consumed by [`CompiledNetwork::build`](crate::CompiledNetwork::build).
pub struct Constraint<Sc: Score> {
    pub(crate) constraint: ConstraintRef,
    pub(crate) weight: Sc,
    pub(crate) impact: ImpactType,
    pub(crate) match_weight: Option<Operand<WeightFn>>,
    pub(crate) stream: Arc<StreamDef>,
}

impl<Sc: Score> Constraint<Sc> {
    pub fn constraint_ref(&self) -> &ConstraintRef {
        &self.constraint
    }

    pub fn weight(&self) -> Sc {
        self.weight
    }

    pub fn impact_type(&self) -> ImpactType {
        self.impact
    }
}

impl<Sc: Score> std::fmt::Debug for Constraint<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constraint")
            .field("constraint", &self.constraint)
            .field("weight", &self.weight)
            .field("impact", &self.impact)
            .finish_non_exhaustive()
    }
}
