// Single-fact stream, plus the aggregations only it supports.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::fact::{Fact, Facts};
use crate::index::DynKey;
use crate::node::KeyFn;

use super::arity_stream_macros::{impl_arity_stream, impl_join};
use super::collector::{erase, ErasedCollector, UniCollector};
use super::def::StreamDef;
use super::operand::{operand, Operand};
use super::{BiStream, TriStream};

impl_arity_stream!(
    /// Stream of single facts of type `A`.
    UniStream,
    [],
    A: 0
);

impl_join!(UniStream, [A] => BiStream);

fn collector_operand<A, C>(collector: C) -> Operand<Arc<dyn ErasedCollector>>
where
    A: 'static,
    C: UniCollector<A> + 'static,
    C::Result: Fact,
{
    operand::<C, _>(erase::<A, C>(collector))
}

impl<A: Fact> UniStream<A> {
    /// One `(key, result)` pair per non-empty group.
    ///
    /// Members leave a group through their collector's retract, so a
    /// single change never re-aggregates the whole group.
    pub fn group_by<K, F, C>(self, key: F, collector: C) -> BiStream<K, C::Result>
    where
        K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
        F: Fn(&A) -> K + Send + Sync + 'static,
        C: UniCollector<A> + 'static,
        C::Result: Fact,
    {
        let erased: KeyFn =
            Arc::new(move |f: Facts<'_>| Arc::new(key(f.get::<A>(0))) as Arc<dyn DynKey>);
        let def = StreamDef::Group {
            parent: self.def,
            keys: vec![operand::<F, _>(erased)],
            collector: Some(collector_operand(collector)),
        };
        BiStream::new(Arc::new(def), self.package)
    }

    /// One `(first, second, result)` triple per non-empty group of facts
    /// sharing both keys.
    pub fn group_by2<K1, K2, F, G, C>(self, first: F, second: G, collector: C) -> TriStream<K1, K2, C::Result>
    where
        K1: Clone + Eq + Hash + Debug + Send + Sync + 'static,
        K2: Clone + Eq + Hash + Debug + Send + Sync + 'static,
        F: Fn(&A) -> K1 + Send + Sync + 'static,
        G: Fn(&A) -> K2 + Send + Sync + 'static,
        C: UniCollector<A> + 'static,
        C::Result: Fact,
    {
        let first: KeyFn =
            Arc::new(move |f: Facts<'_>| Arc::new(first(f.get::<A>(0))) as Arc<dyn DynKey>);
        let second: KeyFn =
            Arc::new(move |f: Facts<'_>| Arc::new(second(f.get::<A>(0))) as Arc<dyn DynKey>);
        let def = StreamDef::Group {
            parent: self.def,
            keys: vec![operand::<F, _>(first), operand::<G, _>(second)],
            collector: Some(collector_operand(collector)),
        };
        TriStream::new(Arc::new(def), self.package)
    }

    /// A single result over every live fact. Emits nothing while the
    /// stream is empty.
    pub fn aggregate<C>(self, collector: C) -> UniStream<C::Result>
    where
        C: UniCollector<A> + 'static,
        C::Result: Fact,
    {
        let def = StreamDef::Group {
            parent: self.def,
            keys: Vec::new(),
            collector: Some(collector_operand(collector)),
        };
        UniStream::new(Arc::new(def), self.package)
    }
}
