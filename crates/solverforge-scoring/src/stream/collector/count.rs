// Count collector.

use std::marker::PhantomData;

use super::{Accumulator, UniCollector};

/// Counts the live members of a group.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use solverforge_core::SimpleScore;
/// use solverforge_scoring::stream::collector::count;
/// use solverforge_scoring::stream::ConstraintFactory;
/// use solverforge_scoring::{CompiledNetwork, Session};
///
/// #[derive(Debug)]
/// struct Visit { nurse: u32 }
///
/// // every nurse pays the square of their visit count
/// let factory = ConstraintFactory::new();
/// let load = factory.for_each::<Visit>()
///     .group_by(|v: &Visit| v.nurse, count())
///     .penalize(SimpleScore::ONE)
///     .with_match_weight(|_: &u32, n: &usize| (*n * *n) as i64)
///     .as_constraint("Load");
///
/// let mut session = Session::new(CompiledNetwork::build([load]).unwrap());
/// for nurse in [1, 1, 2] {
///     session.insert(Arc::new(Visit { nurse })).unwrap();
/// }
/// session.settle().unwrap();
/// assert_eq!(session.score().unwrap(), SimpleScore::of(-5));
/// ```
pub fn count<A>() -> CountCollector<A> {
    CountCollector {
        _phantom: PhantomData,
    }
}

// Collector behind [`count()`]. Members carry no value; the undo token is `()`.
pub struct CountCollector<A> {
    _phantom: PhantomData<fn(&A)>,
}

impl<A> UniCollector<A> for CountCollector<A>
where
    A: Send + Sync,
{
    type Value = ();
    type Result = usize;
    type Accumulator = CountAccumulator;

    #[inline]
    fn extract(&self, _: &A) {}

    fn create_accumulator(&self) -> Self::Accumulator {
        CountAccumulator { members: 0 }
    }
}

pub struct CountAccumulator {
    members: usize,
}

impl Accumulator<(), usize> for CountAccumulator {
    fn accumulate(&mut self, _: &()) {
        self.members += 1;
    }

    // A group node only retracts members it accumulated, so this never
    // goes below zero.
    fn retract(&mut self, _: &()) {
        debug_assert!(self.members > 0, "count retracted below zero");
        self.members -= 1;
    }

    fn finish(&self) -> usize {
        self.members
    }
}
