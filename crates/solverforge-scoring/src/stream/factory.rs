// Constraint factory: the entry point of the stream API.

use std::any::{type_name, TypeId};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::fact::Fact;

use super::def::StreamDef;
use super::joiner::{less_than, Joiner};
use super::{BiStream, UniStream};

/// Creates the source streams constraints are built from.
///
/// Constraints built from one factory share its package name.
#[derive(Debug, Clone)]
pub struct ConstraintFactory {
    package: Arc<str>,
}

impl Default for ConstraintFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintFactory {
    pub fn new() -> Self {
        Self::with_package("")
    }

    pub fn with_package(package: impl Into<String>) -> Self {
        Self {
            package: Arc::from(package.into()),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Every inserted fact of type `A`.
    pub fn for_each<A: Fact>(&self) -> UniStream<A> {
        let def = StreamDef::Source {
            fact_type: TypeId::of::<A>(),
            type_name: type_name::<A>(),
        };
        UniStream::new(Arc::new(def), self.package.clone())
    }

    /// Every unordered pair of distinct `A` facts matching `joiner`, each
    /// pair reported once with the lower `id` on the left.
    ///
    /// `id` must be unique per fact; facts sharing an id never pair.
    pub fn for_each_unique_pair<A, K, F, J>(&self, id: F, joiner: J) -> BiStream<A, A>
    where
        A: Fact,
        K: Ord + Hash + Debug + Send + Sync + 'static,
        F: Fn(&A) -> K + Clone + Send + Sync + 'static,
        J: Joiner<(A,), A>,
    {
        self.for_each::<A>()
            .join(self.for_each::<A>(), joiner.and(less_than(id.clone(), id)))
    }
}
