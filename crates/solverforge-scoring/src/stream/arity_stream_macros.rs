//! Macros for generating arity-specific constraint streams.
//!
//! Every stream handle is a typed view over the same untyped definition
//! tree; the type parameters only fix which fact sits at which position.

/// Generates a stream handle with the operations common to every arity.
///
/// `[$P: i, ..]` are the leading fact types and `$L: i` the last one, which
/// `flatten_last` replaces.
macro_rules! impl_arity_stream {
    ($(#[$doc:meta])* $stream:ident, [$($P:ident : $pi:tt),*], $L:ident : $li:tt) => {
        $(#[$doc])*
        pub struct $stream<$($P,)* $L> {
            pub(crate) def: std::sync::Arc<$crate::stream::def::StreamDef>,
            pub(crate) package: std::sync::Arc<str>,
            _phantom: std::marker::PhantomData<fn() -> ($($P,)* $L,)>,
        }

        impl<$($P,)* $L> Clone for $stream<$($P,)* $L> {
            fn clone(&self) -> Self {
                Self {
                    def: self.def.clone(),
                    package: self.package.clone(),
                    _phantom: std::marker::PhantomData,
                }
            }
        }

        impl<$($P,)* $L> std::fmt::Debug for $stream<$($P,)* $L> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($stream))
                    .field("package", &self.package)
                    .finish_non_exhaustive()
            }
        }

        impl<$($P: $crate::Fact,)* $L: $crate::Fact> $stream<$($P,)* $L> {
            pub(crate) fn new(
                def: std::sync::Arc<$crate::stream::def::StreamDef>,
                package: std::sync::Arc<str>,
            ) -> Self {
                Self {
                    def,
                    package,
                    _phantom: std::marker::PhantomData,
                }
            }

            /// Keeps only the tuples for which `predicate` holds.
            pub fn filter<F>(self, predicate: F) -> Self
            where
                F: Fn($(&$P,)* &$L) -> bool + Send + Sync + 'static,
            {
                let erased: $crate::node::Predicate = std::sync::Arc::new(
                    move |f: $crate::Facts<'_>| predicate($(f.get::<$P>($pi),)* f.get::<$L>($li)),
                );
                let def = std::sync::Arc::new($crate::stream::def::StreamDef::Filter {
                    parent: self.def.clone(),
                    predicate: $crate::stream::operand::operand::<F, _>(erased),
                });
                Self::new(def, self.package)
            }

            /// Keeps the tuples that have at least one match in `other`.
            pub fn if_exists<X, J>(self, other: $crate::stream::UniStream<X>, joiner: J) -> Self
            where
                X: $crate::Fact,
                J: $crate::stream::joiner::Joiner<($($P,)* $L,), X>,
            {
                self.exists(other, joiner, true)
            }

            /// Keeps the tuples that have no match in `other`.
            pub fn if_not_exists<X, J>(self, other: $crate::stream::UniStream<X>, joiner: J) -> Self
            where
                X: $crate::Fact,
                J: $crate::stream::joiner::Joiner<($($P,)* $L,), X>,
            {
                self.exists(other, joiner, false)
            }

            fn exists<X, J>(self, other: $crate::stream::UniStream<X>, joiner: J, should_exist: bool) -> Self
            where
                X: $crate::Fact,
                J: $crate::stream::joiner::Joiner<($($P,)* $L,), X>,
            {
                let def = std::sync::Arc::new($crate::stream::def::StreamDef::Exists {
                    left: self.def.clone(),
                    right: other.def,
                    joiner: <J as $crate::stream::joiner::Joiner<($($P,)* $L,), X>>::lower(joiner),
                    should_exist,
                });
                Self::new(def, self.package)
            }

            /// Replaces every tuple with one derived fact.
            ///
            /// An update that maps to an equal value is not propagated.
            pub fn map<M, F>(self, mapper: F) -> $crate::stream::UniStream<M>
            where
                M: $crate::Fact + PartialEq,
                F: Fn($(&$P,)* &$L) -> M + Send + Sync + 'static,
            {
                let map: $crate::node::MapFn = std::sync::Arc::new(move |f: $crate::Facts<'_>| {
                    $crate::FactRef::new(mapper($(f.get::<$P>($pi),)* f.get::<$L>($li)))
                });
                let def = std::sync::Arc::new($crate::stream::def::StreamDef::Map {
                    parent: self.def.clone(),
                    mappers: vec![$crate::stream::mapper_operand::<F, M>(map)],
                });
                $crate::stream::UniStream::new(def, self.package)
            }

            /// Replaces every tuple with a pair of derived facts.
            pub fn map2<M, N, F, G>(self, first: F, second: G) -> $crate::stream::BiStream<M, N>
            where
                M: $crate::Fact + PartialEq,
                N: $crate::Fact + PartialEq,
                F: Fn($(&$P,)* &$L) -> M + Send + Sync + 'static,
                G: Fn($(&$P,)* &$L) -> N + Send + Sync + 'static,
            {
                let m: $crate::node::MapFn = std::sync::Arc::new(move |f: $crate::Facts<'_>| {
                    $crate::FactRef::new(first($(f.get::<$P>($pi),)* f.get::<$L>($li)))
                });
                let n: $crate::node::MapFn = std::sync::Arc::new(move |f: $crate::Facts<'_>| {
                    $crate::FactRef::new(second($(f.get::<$P>($pi),)* f.get::<$L>($li)))
                });
                let def = std::sync::Arc::new($crate::stream::def::StreamDef::Map {
                    parent: self.def.clone(),
                    mappers: vec![
                        $crate::stream::mapper_operand::<F, M>(m),
                        $crate::stream::mapper_operand::<G, N>(n),
                    ],
                });
                $crate::stream::BiStream::new(def, self.package)
            }

            /// Expands the last fact into zero or more items, one output tuple
            /// per item. Items equal to an item of the previous expansion keep
            /// their tuple on update.
            pub fn flatten_last<I, It, F>(self, flatten: F) -> $stream<$($P,)* I>
            where
                I: $crate::Fact + PartialEq,
                It: IntoIterator<Item = I>,
                F: Fn(&$L) -> It + Send + Sync + 'static,
            {
                let erased: $crate::node::FlattenFn = std::sync::Arc::new(move |last: &$crate::FactRef| {
                    match last.downcast_ref::<$L>() {
                        Some(last) => flatten(last).into_iter().map($crate::FactRef::new).collect(),
                        None => Vec::new(),
                    }
                });
                let def = std::sync::Arc::new($crate::stream::def::StreamDef::FlattenLast {
                    parent: self.def.clone(),
                    flatten: $crate::stream::operand::operand::<F, _>(erased),
                    same: $crate::stream::same_fn::<I>(),
                });
                $stream::new(def, self.package)
            }

            /// Distinct values of `key` over the live tuples.
            pub fn group_by_key<K, F>(self, key: F) -> $crate::stream::UniStream<K>
            where
                K: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
                F: Fn($(&$P,)* &$L) -> K + Send + Sync + 'static,
            {
                let erased: $crate::node::KeyFn = std::sync::Arc::new(move |f: $crate::Facts<'_>| {
                    std::sync::Arc::new(key($(f.get::<$P>($pi),)* f.get::<$L>($li)))
                        as std::sync::Arc<dyn $crate::DynKey>
                });
                let def = std::sync::Arc::new($crate::stream::def::StreamDef::Group {
                    parent: self.def.clone(),
                    keys: vec![$crate::stream::operand::operand::<F, _>(erased)],
                    collector: None,
                });
                $crate::stream::UniStream::new(def, self.package)
            }

            /// Distinct `(first, second)` key pairs over the live tuples.
            pub fn group_by_key2<K1, K2, F, G>(self, first: F, second: G) -> $crate::stream::BiStream<K1, K2>
            where
                K1: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
                K2: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
                F: Fn($(&$P,)* &$L) -> K1 + Send + Sync + 'static,
                G: Fn($(&$P,)* &$L) -> K2 + Send + Sync + 'static,
            {
                let k1: $crate::node::KeyFn = std::sync::Arc::new(move |f: $crate::Facts<'_>| {
                    std::sync::Arc::new(first($(f.get::<$P>($pi),)* f.get::<$L>($li)))
                        as std::sync::Arc<dyn $crate::DynKey>
                });
                let k2: $crate::node::KeyFn = std::sync::Arc::new(move |f: $crate::Facts<'_>| {
                    std::sync::Arc::new(second($(f.get::<$P>($pi),)* f.get::<$L>($li)))
                        as std::sync::Arc<dyn $crate::DynKey>
                });
                let def = std::sync::Arc::new($crate::stream::def::StreamDef::Group {
                    parent: self.def.clone(),
                    keys: vec![
                        $crate::stream::operand::operand::<F, _>(k1),
                        $crate::stream::operand::operand::<G, _>(k2),
                    ],
                    collector: None,
                });
                $crate::stream::BiStream::new(def, self.package)
            }

            /// One tuple per distinct combination of fact values. The output
            /// holds copies of the values, so identity-based explanations
            /// charge the copies.
            pub fn distinct(self) -> Self
            where
                $($P: Clone + Eq + std::hash::Hash,)*
                $L: Clone + Eq + std::hash::Hash,
            {
                let def = std::sync::Arc::new($crate::stream::def::StreamDef::Group {
                    parent: self.def.clone(),
                    keys: vec![
                        $($crate::stream::fact_key::<$P>($pi),)*
                        $crate::stream::fact_key::<$L>($li),
                    ],
                    collector: None,
                });
                Self::new(def, self.package)
            }

            /// The tuples of both streams as one stream.
            pub fn concat(self, other: Self) -> Self {
                let def = std::sync::Arc::new($crate::stream::def::StreamDef::Concat {
                    left: self.def.clone(),
                    right: other.def,
                });
                Self::new(def, self.package)
            }

            /// Every live tuple subtracts `weight` (times its match weight).
            pub fn penalize<Sc: solverforge_core::Score>(
                self,
                weight: Sc,
            ) -> $crate::stream::ConstraintBuilder<Sc, ($($P,)* $L,)> {
                $crate::stream::ConstraintBuilder::new(
                    self.def,
                    self.package,
                    weight,
                    solverforge_core::ImpactType::Penalty,
                )
            }

            /// Every live tuple adds `weight` (times its match weight).
            pub fn reward<Sc: solverforge_core::Score>(
                self,
                weight: Sc,
            ) -> $crate::stream::ConstraintBuilder<Sc, ($($P,)* $L,)> {
                $crate::stream::ConstraintBuilder::new(
                    self.def,
                    self.package,
                    weight,
                    solverforge_core::ImpactType::Reward,
                )
            }
        }

        impl<Sc: solverforge_core::Score, $($P: $crate::Fact,)* $L: $crate::Fact>
            $crate::stream::ConstraintBuilder<Sc, ($($P,)* $L,)>
        {
            /// Scales the weight per match. Defaults to 1.
            pub fn with_match_weight<W>(self, match_weight: W) -> Self
            where
                W: Fn($(&$P,)* &$L) -> i64 + Send + Sync + 'static,
            {
                let erased: $crate::node::WeightFn = std::sync::Arc::new(move |f: $crate::Facts<'_>| {
                    match_weight($(f.get::<$P>($pi),)* f.get::<$L>($li))
                });
                self.set_match_weight($crate::stream::operand::operand::<W, _>(erased))
            }
        }
    };
}

/// Generates `join`, which appends the fact of a joined uni stream.
macro_rules! impl_join {
    ($stream:ident, [$($T:ident),+] => $next:ident) => {
        impl<$($T: $crate::Fact),+> $stream<$($T),+> {
            /// Pairs every tuple with every matching fact of `other`.
            pub fn join<X, J>(self, other: $crate::stream::UniStream<X>, joiner: J) -> $crate::stream::$next<$($T,)+ X>
            where
                X: $crate::Fact,
                J: $crate::stream::joiner::Joiner<($($T,)+), X>,
            {
                let def = std::sync::Arc::new($crate::stream::def::StreamDef::Join {
                    left: self.def,
                    right: other.def,
                    joiner: <J as $crate::stream::joiner::Joiner<($($T,)+), X>>::lower(joiner),
                });
                $crate::stream::$next::new(def, self.package)
            }
        }
    };
}

pub(crate) use impl_arity_stream;
pub(crate) use impl_join;
