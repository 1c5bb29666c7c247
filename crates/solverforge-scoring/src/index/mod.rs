//! Join-key indexing.
//!
//! Keys are type-erased so one indexer type serves every joiner; see
//! [`DynKey`]. A node picks [`ComparisonIndexer`] when its joiner has a
//! comparison, [`EqualsIndexer`] when it has at least one equality joiner
//! and [`NoneIndexer`] otherwise.

mod comparison;
mod equals;
mod key;
mod none;
mod range;

pub use key::{DynKey, IndexKey};
pub use range::RangeValue;

pub(crate) use comparison::ComparisonIndexer;
pub(crate) use equals::EqualsIndexer;
pub(crate) use none::NoneIndexer;
pub(crate) use range::Comparison;

use crate::error::Result;
use crate::tuple::TupleId;

/// Multi-key lookup from a composite key to the tuples stored under it.
pub(crate) trait Indexer: Send {
    /// Stores `tuple` under `key`. A key without the parts this indexer
    /// orders by is index corruption.
    fn put(&mut self, key: &IndexKey, tuple: TupleId) -> Result<()>;

    /// Removes `tuple` from `key`; an absent pair is index corruption.
    fn remove(&mut self, key: &IndexKey, tuple: TupleId) -> Result<()>;

    /// Visits every tuple stored under a key that matches `key`, in a
    /// stable order.
    fn for_each_match(&self, key: &IndexKey, visitor: &mut dyn FnMut(TupleId));

    fn matches(&self, key: &IndexKey) -> Vec<TupleId> {
        let mut found = Vec::new();
        self.for_each_match(key, &mut |t| found.push(t));
        found
    }
}

/// Picks the indexer for a node side with `key_count` equality keys and,
/// when `range` is set, the comparison its stored values must satisfy.
pub(crate) fn indexer_for(key_count: usize, range: Option<Comparison>) -> Box<dyn Indexer> {
    match (key_count, range) {
        (_, Some(op)) => Box::new(ComparisonIndexer::new(op)),
        (0, None) => Box::new(NoneIndexer::default()),
        (_, None) => Box::new(EqualsIndexer::default()),
    }
}

#[cfg(test)]
mod tests;
