//! Fluent constraint stream API.
//!
//! Streams describe constraints; they do not evaluate anything. Every
//! operation appends a node to an untyped definition tree, and
//! [`CompiledNetwork::build`](crate::CompiledNetwork::build) turns a set of
//! finished constraints into one shared node network.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use solverforge_core::SimpleScore;
//! use solverforge_scoring::stream::joiner::equal;
//! use solverforge_scoring::stream::ConstraintFactory;
//! use solverforge_scoring::{CompiledNetwork, Session};
//!
//! #[derive(Debug)]
//! struct Queen {
//!     id: u32,
//!     row: u32,
//! }
//!
//! let row_conflict = ConstraintFactory::new()
//!     .for_each_unique_pair(|q: &Queen| q.id, equal(|q: &Queen| q.row))
//!     .penalize(SimpleScore::of(1))
//!     .as_constraint("Row conflict");
//!
//! let network = Arc::new(CompiledNetwork::build([row_conflict]).unwrap());
//! let mut session = Session::new(network);
//!
//! let queens: Vec<_> = [0, 1, 1]
//!     .into_iter()
//!     .enumerate()
//!     .map(|(id, row)| Arc::new(Queen { id: id as u32, row }))
//!     .collect();
//! for queen in &queens {
//!     session.insert(queen.clone()).unwrap();
//! }
//! session.settle().unwrap();
//! assert_eq!(session.score().unwrap(), SimpleScore::of(-1));
//! ```
//!
//! # Architecture
//!
//! ```text
//! ConstraintFactory::new()
//!     .for_each::<A>()          -> UniStream<A>
//!     .join(other, joiner)      -> BiStream<A, X>
//!     .filter(predicate)        -> BiStream<A, X>
//!     .penalize(weight)         -> ConstraintBuilder<Sc, (A, X)>
//!     .as_constraint(name)      -> Constraint<Sc>
//! ```

mod arity_stream_macros;
mod bi_stream;
mod builder;
pub mod collector;
pub(crate) mod def;
mod factory;
pub mod joiner;
pub(crate) mod operand;
mod quad_stream;
mod tri_stream;
mod uni_stream;

use std::any::TypeId;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

pub use bi_stream::BiStream;
pub use builder::ConstraintBuilder;
#[doc(hidden)]
pub use def::JoinerDef;
pub use def::Constraint;
pub use factory::ConstraintFactory;
pub use quad_stream::QuadStream;
pub use tri_stream::TriStream;
pub use uni_stream::UniStream;

use crate::fact::{FactRef, Facts};
use crate::index::DynKey;
use crate::node::{KeyFn, MapFn, Mapper, SameFn};
use operand::{FnIdentity, Operand};

/// Value equality for derived facts of type `T`.
pub(crate) fn same_fn<T: PartialEq + 'static>() -> SameFn {
    Arc::new(|a: &FactRef, b: &FactRef| a.downcast_ref::<T>() == b.downcast_ref::<T>())
}

/// A mapper built from a user function of type `U` producing `M`.
pub(crate) fn mapper_operand<U: 'static, M: PartialEq + 'static>(map: MapFn) -> Operand<Mapper> {
    Operand {
        id: FnIdentity::of::<U>(Arc::as_ptr(&map).cast::<()>()),
        f: Mapper {
            map,
            same: same_fn::<M>(),
        },
    }
}

/// A key holding a copy of the fact at `index`.
pub(crate) fn fact_key<T>(index: usize) -> Operand<KeyFn>
where
    T: Clone + Eq + Hash + Debug + Send + Sync + 'static,
{
    Operand {
        id: FnIdentity::Composite("fact", vec![FnIdentity::Static(TypeId::of::<T>())]),
        f: Arc::new(move |f: Facts<'_>| Arc::new(f.get::<T>(index).clone()) as Arc<dyn DynKey>),
    }
}
