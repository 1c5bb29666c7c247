//! Min and max collectors.
//!
//! Both keep a counted multiset of the extracted values so that retracting
//! the current extreme falls back to the next one.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use super::{Accumulator, UniCollector};

/// Creates a collector yielding the smallest extracted value, or `None` for
/// an empty group.
///
/// # Example
///
/// ```
/// use solverforge_scoring::stream::collector::{min, UniCollector, Accumulator};
///
/// let collector = min(|x: &i32| *x);
/// let mut acc = collector.create_accumulator();
///
/// acc.accumulate(&collector.extract(&4));
/// acc.accumulate(&collector.extract(&2));
/// assert_eq!(acc.finish(), Some(2));
///
/// acc.retract(&collector.extract(&2));
/// assert_eq!(acc.finish(), Some(4));
/// ```
pub fn min<A, T, F>(mapper: F) -> MinCollector<A, T, F>
where
    T: Ord + Clone + Send + 'static,
    F: Fn(&A) -> T + Send + Sync,
{
    MinCollector {
        mapper,
        _phantom: PhantomData,
    }
}

/// Creates a collector yielding the largest extracted value.
pub fn max<A, T, F>(mapper: F) -> MaxCollector<A, T, F>
where
    T: Ord + Clone + Send + 'static,
    F: Fn(&A) -> T + Send + Sync,
{
    MaxCollector {
        mapper,
        _phantom: PhantomData,
    }
}

/// Created by [`min()`].
pub struct MinCollector<A, T, F> {
    mapper: F,
    _phantom: PhantomData<fn(&A) -> T>,
}

/// Created by [`max()`].
pub struct MaxCollector<A, T, F> {
    mapper: F,
    _phantom: PhantomData<fn(&A) -> T>,
}

#[derive(Debug)]
struct Multiset<T> {
    counts: BTreeMap<T, usize>,
}

impl<T: Ord + Clone> Multiset<T> {
    fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    fn add(&mut self, value: &T) {
        *self.counts.entry(value.clone()).or_insert(0) += 1;
    }

    // A group node only retracts values it accumulated.
    fn remove(&mut self, value: &T) {
        let count = self.counts.get_mut(value);
        debug_assert!(count.is_some(), "retracted a value that was never accumulated");
        if let Some(count) = count {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(value);
            }
        }
    }
}

pub struct MinAccumulator<T> {
    values: Multiset<T>,
}

pub struct MaxAccumulator<T> {
    values: Multiset<T>,
}

impl<A, T, F> UniCollector<A> for MinCollector<A, T, F>
where
    T: Ord + Clone + Send + 'static,
    F: Fn(&A) -> T + Send + Sync,
{
    type Value = T;
    type Result = Option<T>;
    type Accumulator = MinAccumulator<T>;

    #[inline]
    fn extract(&self, entity: &A) -> T {
        (self.mapper)(entity)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        MinAccumulator {
            values: Multiset::new(),
        }
    }
}

impl<A, T, F> UniCollector<A> for MaxCollector<A, T, F>
where
    T: Ord + Clone + Send + 'static,
    F: Fn(&A) -> T + Send + Sync,
{
    type Value = T;
    type Result = Option<T>;
    type Accumulator = MaxAccumulator<T>;

    #[inline]
    fn extract(&self, entity: &A) -> T {
        (self.mapper)(entity)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        MaxAccumulator {
            values: Multiset::new(),
        }
    }
}

impl<T: Ord + Clone + Send> Accumulator<T, Option<T>> for MinAccumulator<T> {
    fn accumulate(&mut self, value: &T) {
        self.values.add(value);
    }

    fn retract(&mut self, value: &T) {
        self.values.remove(value);
    }

    fn finish(&self) -> Option<T> {
        self.values.counts.keys().next().cloned()
    }
}

impl<T: Ord + Clone + Send> Accumulator<T, Option<T>> for MaxAccumulator<T> {
    fn accumulate(&mut self, value: &T) {
        self.values.add(value);
    }

    fn retract(&mut self, value: &T) {
        self.values.remove(value);
    }

    fn finish(&self) -> Option<T> {
        self.values.counts.keys().next_back().cloned()
    }
}
