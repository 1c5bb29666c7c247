// Sum collector.

use std::marker::PhantomData;
use std::ops::{AddAssign, SubAssign};

use super::{Accumulator, UniCollector};

/// Adds up one number per group member.
///
/// The member's number is remembered by the group node and subtracted when
/// the member leaves, so a group total never drifts from its members.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use solverforge_core::SimpleScore;
/// use solverforge_scoring::stream::collector::sum;
/// use solverforge_scoring::stream::ConstraintFactory;
/// use solverforge_scoring::{CompiledNetwork, FactRef, Session};
///
/// #[derive(Debug)]
/// struct Visit { nurse: u32, minutes: i64 }
///
/// // minutes past an eight hour day
/// let factory = ConstraintFactory::new();
/// let overtime = factory.for_each::<Visit>()
///     .group_by(|v: &Visit| v.nurse, sum(|v: &Visit| v.minutes))
///     .filter(|_: &u32, total: &i64| *total > 480)
///     .penalize(SimpleScore::ONE)
///     .with_match_weight(|_: &u32, total: &i64| *total - 480)
///     .as_constraint("Overtime");
///
/// let mut session = Session::new(CompiledNetwork::build([overtime]).unwrap());
/// let long = FactRef::new(Visit { nurse: 1, minutes: 300 });
/// session.insert(long.clone()).unwrap();
/// session.insert(Arc::new(Visit { nurse: 1, minutes: 200 })).unwrap();
/// session.insert(Arc::new(Visit { nurse: 2, minutes: 450 })).unwrap();
/// session.settle().unwrap();
/// assert_eq!(session.score().unwrap(), SimpleScore::of(-20));
///
/// session.retract(long).unwrap();
/// session.settle().unwrap();
/// assert_eq!(session.score().unwrap(), SimpleScore::ZERO);
/// ```
pub fn sum<A, T, F>(mapper: F) -> SumCollector<A, T, F>
where
    F: Fn(&A) -> T + Send + Sync,
{
    SumCollector {
        mapper,
        _phantom: PhantomData,
    }
}

// Collector behind [`sum()`]. The undo token is the member's own number.
pub struct SumCollector<A, T, F> {
    mapper: F,
    _phantom: PhantomData<fn(&A) -> T>,
}

impl<A, T, F> UniCollector<A> for SumCollector<A, T, F>
where
    T: Summable,
    F: Fn(&A) -> T + Send + Sync,
{
    type Value = T;
    type Result = T;
    type Accumulator = SumAccumulator<T>;

    fn extract(&self, member: &A) -> T {
        (self.mapper)(member)
    }

    fn create_accumulator(&self) -> SumAccumulator<T> {
        SumAccumulator {
            total: T::default(),
        }
    }
}

/// Numbers a [`sum()`] can fold.
pub trait Summable: Default + Copy + AddAssign + SubAssign + Send + 'static {}

impl<T> Summable for T where T: Default + Copy + AddAssign + SubAssign + Send + 'static {}

pub struct SumAccumulator<T> {
    total: T,
}

impl<T: Summable> Accumulator<T, T> for SumAccumulator<T> {
    fn accumulate(&mut self, value: &T) {
        self.total += *value;
    }

    fn retract(&mut self, value: &T) {
        self.total -= *value;
    }

    fn finish(&self) -> T {
        self.total
    }
}
