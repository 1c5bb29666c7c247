use std::collections::HashMap;

use indexmap::IndexSet;

use crate::error::{Result, ScoringError};
use crate::tuple::TupleId;

use super::{IndexKey, Indexer};

/// Hash-bucketed indexer for equality joins.
#[derive(Default)]
pub(crate) struct EqualsIndexer {
    buckets: HashMap<IndexKey, IndexSet<TupleId>>,
}

impl Indexer for EqualsIndexer {
    fn put(&mut self, key: &IndexKey, tuple: TupleId) -> Result<()> {
        self.buckets.entry(key.clone()).or_default().insert(tuple);
        Ok(())
    }

    fn remove(&mut self, key: &IndexKey, tuple: TupleId) -> Result<()> {
        let bucket = self
            .buckets
            .get_mut(key)
            .ok_or_else(|| ScoringError::IndexCorruption {
                tuple,
                key: format!("{:?}", key),
            })?;
        if !bucket.swap_remove(&tuple) {
            return Err(ScoringError::IndexCorruption {
                tuple,
                key: format!("{:?}", key),
            });
        }
        if bucket.is_empty() {
            self.buckets.remove(key);
        }
        Ok(())
    }

    fn for_each_match(&self, key: &IndexKey, visitor: &mut dyn FnMut(TupleId)) {
        if let Some(bucket) = self.buckets.get(key) {
            bucket.iter().copied().for_each(visitor);
        }
    }
}
