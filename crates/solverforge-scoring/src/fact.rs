//! Type-erased fact references.
//!
//! A fact is any shared object the session tracks. Identity is the heap
//! allocation: two `FactRef`s are equal only when they point at the same
//! `Arc`, regardless of the values inside. Planning variables that change
//! between settles therefore live behind interior mutability in the fact.

use std::any::{Any, TypeId};
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Anything the session can hold as a fact.
pub trait Fact: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str;
}

impl<T: Any + Debug + Send + Sync> Fact for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Stable identity of a fact allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactKey(usize);

/// Shared, identity-compared handle to a fact.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use solverforge_scoring::FactRef;
///
/// let a = Arc::new(7u32);
/// let r1 = FactRef::from(a.clone());
/// let r2 = FactRef::from(a);
/// let r3 = FactRef::new(7u32);
///
/// assert_eq!(r1, r2);
/// assert_ne!(r1, r3);
/// assert_eq!(r3.downcast_ref::<u32>(), Some(&7));
/// ```
#[derive(Clone)]
pub struct FactRef(Arc<dyn Fact>);

impl FactRef {
    /// Wraps a value in a fresh allocation.
    pub fn new<T: Fact>(value: T) -> Self {
        FactRef(Arc::new(value))
    }

    // Method calls on the `Arc` itself would resolve to the blanket `Fact`
    // impl for `Arc<dyn Fact>`; always go through the pointee.
    fn inner(&self) -> &dyn Fact {
        &*self.0
    }

    pub fn key(&self) -> FactKey {
        FactKey(Arc::as_ptr(&self.0) as *const () as usize)
    }

    /// Runtime type of the referenced value.
    pub fn fact_type(&self) -> TypeId {
        self.inner().as_any().type_id()
    }

    pub fn type_name(&self) -> &'static str {
        self.inner().type_name()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner().as_any().downcast_ref::<T>()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.fact_type() == TypeId::of::<T>()
    }

    pub fn ptr_eq(&self, other: &FactRef) -> bool {
        self.key() == other.key()
    }
}

impl<T: Fact> From<Arc<T>> for FactRef {
    fn from(value: Arc<T>) -> Self {
        FactRef(value)
    }
}

impl PartialEq for FactRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for FactRef {}

impl Hash for FactRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Debug for FactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.0, f)
    }
}

/// Borrowed view over the facts carried by one tuple.
#[derive(Clone, Copy)]
pub struct Facts<'a>(&'a [FactRef]);

impl<'a> Facts<'a> {
    pub(crate) fn new(facts: &'a [FactRef]) -> Self {
        Facts(facts)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fact(&self, index: usize) -> &'a FactRef {
        &self.0[index]
    }

    pub fn as_slice(&self) -> &'a [FactRef] {
        self.0
    }

    /// Typed access to the fact at `index`.
    ///
    /// # Panics
    /// Panics if the position holds another type. Typed stream handles
    /// guarantee the layout, so this only fires on a network built by hand.
    pub fn get<T: 'static>(&self, index: usize) -> &'a T {
        let fact = &self.0[index];
        match fact.downcast_ref::<T>() {
            Some(value) => value,
            None => panic!(
                "fact {} is a {}, not a {}",
                index,
                fact.type_name(),
                std::any::type_name::<T>()
            ),
        }
    }
}

impl Debug for Facts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, PartialEq)]
    struct Shift(u32);

    #[test]
    fn test_identity_not_value() {
        let a = FactRef::new(Shift(1));
        let b = FactRef::new(Shift(1));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        let set: HashSet<FactRef> = [a.clone(), b.clone(), a.clone()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_type_queries() {
        let fact = FactRef::new(Shift(4));
        assert!(fact.is::<Shift>());
        assert_eq!(fact.fact_type(), TypeId::of::<Shift>());
        assert!(fact.type_name().ends_with("Shift"));
        assert_eq!(fact.downcast_ref::<Shift>(), Some(&Shift(4)));
        assert!(fact.downcast_ref::<u32>().is_none());
    }

    #[test]
    fn test_type_queries_through_shared_arc() {
        let shared = Arc::new(Shift(5));
        let fact = FactRef::from(shared.clone());
        assert_eq!(fact.fact_type(), TypeId::of::<Shift>());
        assert_ne!(fact.fact_type(), TypeId::of::<Arc<dyn Fact>>());
        assert_eq!(fact.downcast_ref::<Shift>(), Some(&*shared));
        assert!(!fact.type_name().contains("Arc"));
    }

    #[test]
    fn test_facts_view() {
        let facts = vec![FactRef::new(Shift(1)), FactRef::new(9i64)];
        let view = Facts::new(&facts);
        assert_eq!(view.len(), 2);
        assert_eq!(view.get::<Shift>(0), &Shift(1));
        assert_eq!(*view.get::<i64>(1), 9);
    }

    #[test]
    #[should_panic(expected = "not a")]
    fn test_facts_view_type_mismatch_panics() {
        let facts = vec![FactRef::new(Shift(1))];
        Facts::new(&facts).get::<i64>(0);
    }
}
