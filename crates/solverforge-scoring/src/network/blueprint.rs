//! Immutable node descriptions, instantiated once per session.

use std::sync::Arc;

use smallvec::SmallVec;

use solverforge_core::{ImpactType, Score};

use crate::index::{indexer_for, Comparison};
use crate::node::{
    ConcatNode, ExistsNode, ExistsSide, FilterNode, FlattenFn, FlattenLastNode, GroupNode, JoinNode,
    JoinSide, KeyExtractor, KeyFn, MapNode, Mapper, Node, PairPredicate, Predicate, SameFn,
    ScorerNode, SourceNode, WeightFn,
};
use crate::stream::collector::ErasedCollector;

/// Slots one input of a join or exists node reserved on its tuples.
#[derive(Clone)]
pub(crate) struct SideLayout {
    pub(crate) keys: KeyExtractor,
    /// How this side's stored range values relate to the other side's.
    pub(crate) range: Option<Comparison>,
    pub(crate) key_slot: usize,
    /// Pair map (join) or match set (exists).
    pub(crate) links_slot: usize,
}

pub(crate) enum NodeKind<Sc: Score> {
    Source {
        type_name: &'static str,
    },
    Filter {
        predicate: Predicate,
        slot: usize,
    },
    Map {
        mappers: Vec<Mapper>,
        slot: usize,
    },
    FlattenLast {
        flatten: FlattenFn,
        same: SameFn,
        slot: usize,
    },
    Join {
        left: SideLayout,
        right: SideLayout,
        filters: Vec<PairPredicate>,
    },
    Exists {
        should_exist: bool,
        left: SideLayout,
        right: SideLayout,
        filters: Vec<PairPredicate>,
        forwarded_slot: usize,
    },
    Concat {
        left_slot: usize,
        right_slot: usize,
    },
    Group {
        keys: Vec<KeyFn>,
        collector: Option<Arc<dyn ErasedCollector>>,
        key_slot: usize,
        token_slot: usize,
    },
    Scorer {
        constraint: usize,
        weight: Sc,
        impact: ImpactType,
        match_weight: Option<WeightFn>,
        slot: usize,
    },
}

impl<Sc: Score> NodeKind<Sc> {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            NodeKind::Source { .. } => "source",
            NodeKind::Filter { .. } => "filter",
            NodeKind::Map { .. } => "map",
            NodeKind::FlattenLast { .. } => "flatten_last",
            NodeKind::Join { .. } => "join",
            NodeKind::Exists {
                should_exist: true, ..
            } => "if_exists",
            NodeKind::Exists { .. } => "if_not_exists",
            NodeKind::Concat { .. } => "concat",
            NodeKind::Group { .. } => "group",
            NodeKind::Scorer { .. } => "scorer",
        }
    }

    /// Forwarders pass their left input through, so their children store
    /// state on the tuples of the nearest producer above them.
    pub(crate) fn forwards_input(&self) -> bool {
        matches!(self, NodeKind::Filter { .. } | NodeKind::Exists { .. })
    }
}

pub(crate) struct Blueprint<Sc: Score> {
    pub(crate) kind: NodeKind<Sc>,
    pub(crate) parents: SmallVec<[usize; 2]>,
    pub(crate) layer: usize,
}

impl<Sc: Score> Blueprint<Sc> {
    /// Builds the live node. `store_size` is the slot count of the tuples
    /// this node produces.
    pub(crate) fn instantiate(&self, store_size: usize) -> Box<dyn Node<Sc>> {
        match &self.kind {
            NodeKind::Source { .. } => Box::new(SourceNode::new(store_size)),
            NodeKind::Filter { predicate, slot } => Box::new(FilterNode::new(predicate.clone(), *slot)),
            NodeKind::Map { mappers, slot } => Box::new(MapNode::new(mappers.clone(), *slot, store_size)),
            NodeKind::FlattenLast {
                flatten,
                same,
                slot,
            } => Box::new(FlattenLastNode::new(
                flatten.clone(),
                same.clone(),
                *slot,
                store_size,
            )),
            NodeKind::Join {
                left,
                right,
                filters,
            } => Box::new(JoinNode::new(
                join_side(left),
                join_side(right),
                filters.clone(),
                store_size,
            )),
            NodeKind::Exists {
                should_exist,
                left,
                right,
                filters,
                forwarded_slot,
            } => Box::new(ExistsNode::new(
                *should_exist,
                exists_side(left),
                exists_side(right),
                filters.clone(),
                *forwarded_slot,
            )),
            NodeKind::Concat {
                left_slot,
                right_slot,
            } => Box::new(ConcatNode::new(*left_slot, *right_slot, store_size)),
            NodeKind::Group {
                keys,
                collector,
                key_slot,
                token_slot,
            } => Box::new(GroupNode::new(
                keys.clone(),
                collector.clone(),
                *key_slot,
                *token_slot,
                store_size,
            )),
            NodeKind::Scorer {
                constraint,
                weight,
                impact,
                match_weight,
                slot,
            } => Box::new(ScorerNode::new(
                *constraint,
                *weight,
                *impact,
                match_weight.clone(),
                *slot,
            )),
        }
    }
}

fn join_side(layout: &SideLayout) -> JoinSide {
    JoinSide::new(
        layout.keys.clone(),
        indexer_for(layout.keys.equal.len(), layout.range),
        layout.key_slot,
        layout.links_slot,
    )
}

fn exists_side(layout: &SideLayout) -> ExistsSide {
    ExistsSide::new(
        layout.keys.clone(),
        indexer_for(layout.keys.equal.len(), layout.range),
        layout.key_slot,
        layout.links_slot,
    )
}
