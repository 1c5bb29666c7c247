use std::collections::{BTreeMap, HashMap};

use indexmap::IndexSet;

use crate::error::{Result, ScoringError};
use crate::tuple::TupleId;

use super::range::{Comparison, RangeKey};
use super::{IndexKey, Indexer};

/// Equality buckets, each ordered by the key's range value.
///
/// A lookup walks only the part of its bucket on the matching side of the
/// queried value, in ascending value order.
pub(crate) struct ComparisonIndexer {
    op: Comparison,
    buckets: HashMap<IndexKey, BTreeMap<RangeKey, IndexSet<TupleId>>>,
}

impl ComparisonIndexer {
    pub(crate) fn new(op: Comparison) -> Self {
        Self {
            op,
            buckets: HashMap::new(),
        }
    }
}

fn corruption(key: &IndexKey, tuple: TupleId) -> ScoringError {
    ScoringError::IndexCorruption {
        tuple,
        key: format!("{:?}", key),
    }
}

impl Indexer for ComparisonIndexer {
    fn put(&mut self, key: &IndexKey, tuple: TupleId) -> Result<()> {
        let range = key.range().ok_or_else(|| corruption(key, tuple))?.clone();
        let values = self.buckets.entry(key.prefix()).or_default();
        values.entry(range).or_default().insert(tuple);
        Ok(())
    }

    fn remove(&mut self, key: &IndexKey, tuple: TupleId) -> Result<()> {
        let range = key.range().ok_or_else(|| corruption(key, tuple))?;
        let prefix = key.prefix();
        let values = self
            .buckets
            .get_mut(&prefix)
            .ok_or_else(|| corruption(key, tuple))?;
        let tuples = values.get_mut(range).ok_or_else(|| corruption(key, tuple))?;
        if !tuples.swap_remove(&tuple) {
            return Err(corruption(key, tuple));
        }
        if tuples.is_empty() {
            values.remove(range);
        }
        if values.is_empty() {
            self.buckets.remove(&prefix);
        }
        Ok(())
    }

    fn for_each_match(&self, key: &IndexKey, visitor: &mut dyn FnMut(TupleId)) {
        let Some(query) = key.range() else {
            return;
        };
        if let Some(values) = self.buckets.get(&key.prefix()) {
            for tuples in values.range(self.op.bounds(query)).map(|(_, tuples)| tuples) {
                tuples.iter().copied().for_each(&mut *visitor);
            }
        }
    }
}
