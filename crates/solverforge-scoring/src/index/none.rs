use indexmap::IndexSet;

use crate::error::{Result, ScoringError};
use crate::tuple::TupleId;

use super::{IndexKey, Indexer};

/// Single-bucket indexer: every key matches every tuple.
#[derive(Default)]
pub(crate) struct NoneIndexer {
    tuples: IndexSet<TupleId>,
}

impl Indexer for NoneIndexer {
    fn put(&mut self, _key: &IndexKey, tuple: TupleId) -> Result<()> {
        self.tuples.insert(tuple);
        Ok(())
    }

    fn remove(&mut self, key: &IndexKey, tuple: TupleId) -> Result<()> {
        if self.tuples.swap_remove(&tuple) {
            Ok(())
        } else {
            Err(ScoringError::IndexCorruption {
                tuple,
                key: format!("{:?}", key),
            })
        }
    }

    fn for_each_match(&self, _key: &IndexKey, visitor: &mut dyn FnMut(TupleId)) {
        self.tuples.iter().copied().for_each(visitor);
    }
}
