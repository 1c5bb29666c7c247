// Joiners: matching conditions between a stream and a joined uni stream.
//
// The left side of a joiner reads every fact of the left tuple, so a joiner
// used on a `BiStream<A, B>` takes left functions of the form
// `|a: &A, b: &B| ...`. The right side always reads the single fact of the
// joined `UniStream<X>`.
//
// `equal` and `equal_bi` become index keys. The first comparison joiner
// orders the index buckets, so a lookup reads only the matching range.
// `overlapping`, `filtering` and any further comparison are residual
// filters evaluated only on pairs the index already matched.

mod comparison;
mod equal;
mod filtering;
mod overlapping;

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

pub use comparison::{
    greater_than, greater_than_or_equal, less_than, less_than_or_equal, GreaterThanJoiner,
    GreaterThanOrEqualJoiner, LessThanJoiner, LessThanOrEqualJoiner,
};
pub use equal::{equal, equal_bi, EqualJoiner};
pub use filtering::{filtering, FilteringJoiner};
pub use overlapping::{overlapping, OverlappingJoiner};

use crate::fact::Facts;
use crate::index::{Comparison, DynKey, RangeValue};
use crate::node::{KeyFn, PairPredicate, RangeFn};

use super::def::{JoinerDef, RangeDef};
use super::operand::{operand, FnIdentity, Operand};

/// Matching condition between left tuples of type `L` (a tuple of the left
/// stream's fact types) and right facts of type `X`.
pub trait Joiner<L, X>: Send + Sync + Sized + 'static {
    #[doc(hidden)]
    fn lower(self) -> JoinerDef;

    // Combines this joiner with another using AND semantics.
    fn and<J>(self, other: J) -> AndJoiner<Self, J>
    where
        J: Joiner<L, X>,
    {
        AndJoiner {
            first: self,
            second: other,
        }
    }
}

/// Both joiners must match. Created by [`Joiner::and`].
pub struct AndJoiner<J1, J2> {
    first: J1,
    second: J2,
}

impl<L, X, J1, J2> Joiner<L, X> for AndJoiner<J1, J2>
where
    J1: Joiner<L, X>,
    J2: Joiner<L, X>,
{
    fn lower(self) -> JoinerDef {
        self.first.lower().and(self.second.lower())
    }
}

/// Matches every pair.
pub fn cross() -> CrossJoiner {
    CrossJoiner
}

pub struct CrossJoiner;

impl<L, X> Joiner<L, X> for CrossJoiner {
    fn lower(self) -> JoinerDef {
        JoinerDef::default()
    }
}

fn key_operand<U: 'static>(key: KeyFn) -> Operand<KeyFn> {
    operand::<U, _>(key)
}

fn filter_operand<U: 'static>(tag: &'static str, predicate: PairPredicate) -> Operand<PairPredicate> {
    let allocation = Arc::as_ptr(&predicate).cast::<()>();
    Operand {
        id: FnIdentity::composite(tag, vec![FnIdentity::of::<U>(allocation)], allocation),
        f: predicate,
    }
}

fn filter_only(filter: Operand<PairPredicate>) -> JoinerDef {
    JoinerDef {
        filters: vec![filter],
        ..JoinerDef::default()
    }
}

macro_rules! impl_comparison {
    ($joiner:ident, $op:ident; $($T:ident : $i:tt),+) => {
        impl<$($T: 'static,)+ X: 'static, V, FL, FR> Joiner<($($T,)+), X> for $joiner<FL, FR, V>
        where
            V: Ord + Hash + Debug + Send + Sync + 'static,
            FL: Fn($(&$T),+) -> V + Send + Sync + 'static,
            FR: Fn(&X) -> V + Send + Sync + 'static,
        {
            fn lower(self) -> JoinerDef {
                let (left, right) = (self.left, self.right);
                let left: RangeFn = Arc::new(move |f: Facts<'_>| {
                    Arc::new(left($(f.get::<$T>($i)),+)) as Arc<dyn RangeValue>
                });
                let right: RangeFn = Arc::new(move |f: Facts<'_>| {
                    Arc::new(right(f.get::<X>(0))) as Arc<dyn RangeValue>
                });
                JoinerDef {
                    range: Some(RangeDef {
                        left: operand::<FL, _>(left),
                        right: operand::<FR, _>(right),
                        op: Comparison::$op,
                    }),
                    ..JoinerDef::default()
                }
            }
        }
    };
}

macro_rules! impl_left_arity {
    ($($T:ident : $i:tt),+) => {
        impl<$($T: 'static,)+ X: 'static, K, FL, FR> Joiner<($($T,)+), X> for EqualJoiner<FL, FR, K>
        where
            K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
            FL: Fn($(&$T),+) -> K + Send + Sync + 'static,
            FR: Fn(&X) -> K + Send + Sync + 'static,
        {
            fn lower(self) -> JoinerDef {
                let (left, right) = (self.left, self.right);
                let left: KeyFn = Arc::new(move |f: Facts<'_>| {
                    Arc::new(left($(f.get::<$T>($i)),+)) as Arc<dyn DynKey>
                });
                let right: KeyFn = Arc::new(move |f: Facts<'_>| {
                    Arc::new(right(f.get::<X>(0))) as Arc<dyn DynKey>
                });
                JoinerDef {
                    left_keys: vec![key_operand::<FL>(left)],
                    right_keys: vec![key_operand::<FR>(right)],
                    ..JoinerDef::default()
                }
            }
        }

        impl_comparison!(LessThanJoiner, LessThan; $($T : $i),+);
        impl_comparison!(LessThanOrEqualJoiner, LessThanOrEqual; $($T : $i),+);
        impl_comparison!(GreaterThanJoiner, GreaterThan; $($T : $i),+);
        impl_comparison!(GreaterThanOrEqualJoiner, GreaterThanOrEqual; $($T : $i),+);

        impl<$($T: 'static,)+ X: 'static, F> Joiner<($($T,)+), X> for FilteringJoiner<F>
        where
            F: Fn($(&$T,)+ &X) -> bool + Send + Sync + 'static,
        {
            fn lower(self) -> JoinerDef {
                let f = self.predicate;
                let predicate: PairPredicate = Arc::new(move |l: Facts<'_>, r: Facts<'_>| {
                    f($(l.get::<$T>($i),)+ r.get::<X>(0))
                });
                filter_only(filter_operand::<F>("filtering", predicate))
            }
        }

        impl<$($T: 'static,)+ X: 'static, V, SL, EL, SR, ER> Joiner<($($T,)+), X>
            for OverlappingJoiner<SL, EL, SR, ER, V>
        where
            V: Ord + 'static,
            SL: Fn($(&$T),+) -> V + Send + Sync + 'static,
            EL: Fn($(&$T),+) -> V + Send + Sync + 'static,
            SR: Fn(&X) -> V + Send + Sync + 'static,
            ER: Fn(&X) -> V + Send + Sync + 'static,
        {
            fn lower(self) -> JoinerDef {
                let OverlappingJoiner { start_left, end_left, start_right, end_right, .. } = self;
                let predicate: PairPredicate = Arc::new(move |l: Facts<'_>, r: Facts<'_>| {
                    let x = r.get::<X>(0);
                    start_left($(l.get::<$T>($i)),+) < end_right(x)
                        && start_right(x) < end_left($(l.get::<$T>($i)),+)
                });
                filter_only(filter_operand::<(SL, EL, SR, ER)>("overlapping", predicate))
            }
        }
    };
}

impl_left_arity!(A: 0);
impl_left_arity!(A: 0, B: 1);
impl_left_arity!(A: 0, B: 1, C: 2);
impl_left_arity!(A: 0, B: 1, C: 2, D: 3);

#[cfg(test)]
mod tests;
