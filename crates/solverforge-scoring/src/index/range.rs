use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::ops::Bound;
use std::sync::Arc;

/// A totally ordered value of any type, usable as the range part of an
/// index key.
///
/// Blanket-implemented for every `Ord + Hash + Debug` type. Values of
/// different types order by type id, so they never compare equal.
pub trait RangeValue: Any + Debug + Send + Sync {
    fn value_any(&self) -> &dyn Any;

    fn cmp_value(&self, other: &dyn RangeValue) -> Ordering;

    fn hash_value(&self, state: &mut dyn Hasher);
}

impl<T> RangeValue for T
where
    T: Any + Debug + Ord + Hash + Send + Sync,
{
    fn value_any(&self) -> &dyn Any {
        self
    }

    fn cmp_value(&self, other: &dyn RangeValue) -> Ordering {
        let other = other.value_any();
        match other.downcast_ref::<T>() {
            Some(other) => self.cmp(other),
            None => TypeId::of::<T>().cmp(&other.type_id()),
        }
    }

    fn hash_value(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

/// Ordered handle over an erased [`RangeValue`].
#[derive(Clone)]
pub(crate) struct RangeKey(Arc<dyn RangeValue>);

impl RangeKey {
    pub(crate) fn new(value: Arc<dyn RangeValue>) -> Self {
        RangeKey(value)
    }
}

impl PartialEq for RangeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RangeKey {}

impl PartialOrd for RangeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RangeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (*self.0).cmp_value(&*other.0)
    }
}

impl Hash for RangeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (*self.0).hash_value(state);
    }
}

impl Debug for RangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.0, f)
    }
}

/// How a stored range value must relate to a queried one: a tuple stored
/// under `s` matches a query for `q` when `s <op> q` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Comparison {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Comparison {
    /// The same condition read from the other operand.
    pub(crate) fn flip(self) -> Self {
        match self {
            Comparison::LessThan => Comparison::GreaterThan,
            Comparison::LessThanOrEqual => Comparison::GreaterThanOrEqual,
            Comparison::GreaterThan => Comparison::LessThan,
            Comparison::GreaterThanOrEqual => Comparison::LessThanOrEqual,
        }
    }

    /// Whether `a <op> b` holds, given `a.cmp(b)`.
    pub(crate) fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::LessThan => ordering == Ordering::Less,
            Comparison::LessThanOrEqual => ordering != Ordering::Greater,
            Comparison::GreaterThan => ordering == Ordering::Greater,
            Comparison::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }

    /// The stored values that match a query for `q`.
    pub(crate) fn bounds(self, q: &RangeKey) -> (Bound<&RangeKey>, Bound<&RangeKey>) {
        match self {
            Comparison::LessThan => (Bound::Unbounded, Bound::Excluded(q)),
            Comparison::LessThanOrEqual => (Bound::Unbounded, Bound::Included(q)),
            Comparison::GreaterThan => (Bound::Excluded(q), Bound::Unbounded),
            Comparison::GreaterThanOrEqual => (Bound::Included(q), Bound::Unbounded),
        }
    }

    pub(crate) fn tag(self) -> &'static str {
        match self {
            Comparison::LessThan => "less_than",
            Comparison::LessThanOrEqual => "less_than_or_equal",
            Comparison::GreaterThan => "greater_than",
            Comparison::GreaterThanOrEqual => "greater_than_or_equal",
        }
    }
}
