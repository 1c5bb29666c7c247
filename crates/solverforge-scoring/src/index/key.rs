use std::any::{Any, TypeId};
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::fact::FactRef;

use super::range::{RangeKey, RangeValue};

/// A hashable, comparable value of any type, usable as part of an index key.
///
/// Blanket-implemented for every `Clone + Eq + Hash + Debug` type. Values of
/// different types never compare equal.
pub trait DynKey: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn dyn_eq(&self, other: &dyn DynKey) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);

    /// The key value as a fresh fact, for group outputs.
    fn to_fact(&self) -> FactRef;
}

impl<T> DynKey for T
where
    T: Any + Debug + Clone + Eq + Hash + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynKey) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }

    fn to_fact(&self) -> FactRef {
        FactRef::new(self.clone())
    }
}

/// Composite key: one component per equality joiner, or per group key,
/// plus an optional range value for a comparison joiner.
///
/// The empty key is the single bucket of an unindexed side or a global group.
#[derive(Clone, Default)]
pub struct IndexKey {
    parts: SmallVec<[Arc<dyn DynKey>; 2]>,
    range: Option<RangeKey>,
}

impl IndexKey {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single<T: DynKey>(value: T) -> Self {
        Self::from_parts([Arc::new(value) as Arc<dyn DynKey>])
    }

    pub(crate) fn from_parts(parts: impl IntoIterator<Item = Arc<dyn DynKey>>) -> Self {
        IndexKey {
            parts: parts.into_iter().collect(),
            range: None,
        }
    }

    pub(crate) fn with_range(mut self, value: Arc<dyn RangeValue>) -> Self {
        self.range = Some(RangeKey::new(value));
        self
    }

    /// Number of equality parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty() && self.range.is_none()
    }

    pub fn part(&self, index: usize) -> Option<&dyn DynKey> {
        self.parts.get(index).map(|p| &**p)
    }

    pub(crate) fn parts(&self) -> impl Iterator<Item = &dyn DynKey> {
        self.parts.iter().map(|p| &**p)
    }

    pub(crate) fn range(&self) -> Option<&RangeKey> {
        self.range.as_ref()
    }

    /// The equality parts alone.
    pub(crate) fn prefix(&self) -> IndexKey {
        IndexKey {
            parts: self.parts.clone(),
            range: None,
        }
    }
}

impl PartialEq for IndexKey {
    fn eq(&self, other: &Self) -> bool {
        self.parts.len() == other.parts.len()
            && self
                .parts
                .iter()
                .zip(other.parts.iter())
                .all(|(a, b)| a.dyn_eq(&**b))
            && self.range == other.range
    }
}

impl Eq for IndexKey {}

impl Hash for IndexKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.parts.len());
        for part in &self.parts {
            part.dyn_hash(state);
        }
        self.range.hash(state);
    }
}

impl Debug for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("IndexKey");
        tuple.field(&&self.parts[..]);
        if let Some(range) = &self.range {
            tuple.field(range);
        }
        tuple.finish()
    }
}
