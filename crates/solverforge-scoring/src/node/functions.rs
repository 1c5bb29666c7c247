//! Erased operand closures stored in compiled nodes.

use std::sync::Arc;

use crate::fact::{FactRef, Facts};
use crate::index::{DynKey, IndexKey, RangeValue};

pub(crate) type Predicate = Arc<dyn Fn(Facts<'_>) -> bool + Send + Sync>;

pub(crate) type PairPredicate = Arc<dyn Fn(Facts<'_>, Facts<'_>) -> bool + Send + Sync>;

pub(crate) type KeyFn = Arc<dyn Fn(Facts<'_>) -> Arc<dyn DynKey> + Send + Sync>;

pub(crate) type RangeFn = Arc<dyn Fn(Facts<'_>) -> Arc<dyn RangeValue> + Send + Sync>;

pub(crate) type MapFn = Arc<dyn Fn(Facts<'_>) -> FactRef + Send + Sync>;

/// Value equality of two derived facts of the same type.
pub(crate) type SameFn = Arc<dyn Fn(&FactRef, &FactRef) -> bool + Send + Sync>;

pub(crate) type FlattenFn = Arc<dyn Fn(&FactRef) -> Vec<FactRef> + Send + Sync>;

pub(crate) type WeightFn = Arc<dyn Fn(Facts<'_>) -> i64 + Send + Sync>;

#[derive(Clone)]
pub(crate) struct Mapper {
    pub(crate) map: MapFn,
    pub(crate) same: SameFn,
}

pub(crate) fn compute_key(keys: &[KeyFn], facts: Facts<'_>) -> IndexKey {
    IndexKey::from_parts(keys.iter().map(|key| key(facts)))
}

/// What one input of a join or exists node indexes its tuples by.
#[derive(Clone, Default)]
pub(crate) struct KeyExtractor {
    pub(crate) equal: Vec<KeyFn>,
    pub(crate) range: Option<RangeFn>,
}

impl KeyExtractor {
    pub(crate) fn key(&self, facts: Facts<'_>) -> IndexKey {
        let key = compute_key(&self.equal, facts);
        match &self.range {
            Some(range) => key.with_range(range(facts)),
            None => key,
        }
    }
}
