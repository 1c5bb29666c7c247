//! Hash-consing compiler from stream definitions to blueprints.

use std::any::TypeId;
use std::collections::HashMap;

use smallvec::{smallvec, SmallVec};

use solverforge_core::{ImpactType, Score};

use crate::index::Comparison;
use crate::node::{Edge, Input, KeyExtractor, PairPredicate, WeightFn};
use crate::stream::def::{JoinerDef, StreamDef};
use crate::stream::operand::{FnIdentity, Operand};

use super::blueprint::{Blueprint, NodeKind, SideLayout};

/// Structural identity of a node: what it does and what it reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Signature {
    kind: &'static str,
    parents: SmallVec<[usize; 2]>,
    operands: Vec<FnIdentity>,
}

/// One compilation; the sharing table lives and dies with it.
pub(crate) struct Compiler<Sc: Score> {
    pub(crate) blueprints: Vec<Blueprint<Sc>>,
    pub(crate) children: Vec<Vec<Edge>>,
    pub(crate) store_sizes: Vec<usize>,
    pub(crate) sources: HashMap<TypeId, usize>,
    pub(crate) shared_hits: usize,
    cache: HashMap<Signature, usize>,
}

impl<Sc: Score> Compiler<Sc> {
    pub(crate) fn new() -> Self {
        Self {
            blueprints: Vec::new(),
            children: Vec::new(),
            store_sizes: Vec::new(),
            sources: HashMap::new(),
            shared_hits: 0,
            cache: HashMap::new(),
        }
    }

    /// Compiles `def` and returns the id of the node producing its tuples.
    pub(crate) fn stream(&mut self, def: &StreamDef) -> usize {
        match def {
            StreamDef::Source {
                fact_type,
                type_name,
            } => {
                if let Some(&id) = self.sources.get(fact_type) {
                    return id;
                }
                let id = self.push(NodeKind::Source { type_name: *type_name }, smallvec![]);
                self.sources.insert(*fact_type, id);
                id
            }
            StreamDef::Filter { parent, predicate } => {
                let parent = self.stream(parent);
                let signature = Signature {
                    kind: "filter",
                    parents: smallvec![parent],
                    operands: vec![predicate.id.clone()],
                };
                self.shared(signature, |c| {
                    let slot = c.reserve(parent, 1);
                    NodeKind::Filter {
                        predicate: predicate.f.clone(),
                        slot,
                    }
                })
            }
            StreamDef::Map { parent, mappers } => {
                let parent = self.stream(parent);
                let signature = Signature {
                    kind: "map",
                    parents: smallvec![parent],
                    operands: mappers.iter().map(|m| m.id.clone()).collect(),
                };
                self.shared(signature, |c| {
                    let slot = c.reserve(parent, 1);
                    NodeKind::Map {
                        mappers: mappers.iter().map(|m| m.f.clone()).collect(),
                        slot,
                    }
                })
            }
            StreamDef::FlattenLast {
                parent,
                flatten,
                same,
            } => {
                let parent = self.stream(parent);
                let signature = Signature {
                    kind: "flatten_last",
                    parents: smallvec![parent],
                    operands: vec![flatten.id.clone()],
                };
                self.shared(signature, |c| {
                    let slot = c.reserve(parent, 1);
                    NodeKind::FlattenLast {
                        flatten: flatten.f.clone(),
                        same: same.clone(),
                        slot,
                    }
                })
            }
            StreamDef::Join {
                left,
                right,
                joiner,
            } => {
                let (left, right) = (self.stream(left), self.stream(right));
                let signature = Signature {
                    kind: "join",
                    parents: smallvec![left, right],
                    operands: joiner.identity(),
                };
                self.shared(signature, |c| {
                    let lowered = lower(joiner);
                    NodeKind::Join {
                        left: c.side(left, lowered.left, lowered.range, 2).0,
                        right: c.side(right, lowered.right, lowered.range.map(Comparison::flip), 2).0,
                        filters: lowered.filters,
                    }
                })
            }
            StreamDef::Exists {
                left,
                right,
                joiner,
                should_exist,
            } => {
                let (left, right) = (self.stream(left), self.stream(right));
                let signature = Signature {
                    kind: if *should_exist {
                        "if_exists"
                    } else {
                        "if_not_exists"
                    },
                    parents: smallvec![left, right],
                    operands: joiner.identity(),
                };
                self.shared(signature, |c| {
                    let lowered = lower(joiner);
                    let (left, base) = c.side(left, lowered.left, lowered.range, 3);
                    NodeKind::Exists {
                        should_exist: *should_exist,
                        left,
                        right: c.side(right, lowered.right, lowered.range.map(Comparison::flip), 2).0,
                        filters: lowered.filters,
                        forwarded_slot: base + 2,
                    }
                })
            }
            StreamDef::Concat { left, right } => {
                let (left, right) = (self.stream(left), self.stream(right));
                let signature = Signature {
                    kind: "concat",
                    parents: smallvec![left, right],
                    operands: Vec::new(),
                };
                self.shared(signature, |c| NodeKind::Concat {
                    left_slot: c.reserve(left, 1),
                    right_slot: c.reserve(right, 1),
                })
            }
            StreamDef::Group {
                parent,
                keys,
                collector,
            } => {
                let parent = self.stream(parent);
                let signature = Signature {
                    kind: "group",
                    parents: smallvec![parent],
                    operands: vec![
                        FnIdentity::Composite("keys", keys.iter().map(|k| k.id.clone()).collect()),
                        collector
                            .as_ref()
                            .map_or(FnIdentity::tag("no_collector"), |c| c.id.clone()),
                    ],
                };
                self.shared(signature, |c| {
                    let key_slot = c.reserve(parent, 2);
                    NodeKind::Group {
                        keys: keys.iter().map(|k| k.f.clone()).collect(),
                        collector: collector.as_ref().map(|c| c.f.clone()),
                        key_slot,
                        token_slot: key_slot + 1,
                    }
                })
            }
        }
    }

    /// Appends a scorer below `parent`. Scorers are never shared.
    pub(crate) fn scorer(
        &mut self,
        parent: usize,
        constraint: usize,
        weight: Sc,
        impact: ImpactType,
        match_weight: Option<WeightFn>,
    ) -> usize {
        let slot = self.reserve(parent, 1);
        self.push(
            NodeKind::Scorer {
                constraint,
                weight,
                impact,
                match_weight,
                slot,
            },
            smallvec![parent],
        )
    }

    /// Groups node ids by layer, keeping id order inside each layer.
    pub(crate) fn layers(&self) -> Vec<Vec<usize>> {
        let depth = self.blueprints.iter().map(|b| b.layer + 1).max().unwrap_or(0);
        let mut layers = vec![Vec::new(); depth];
        for (id, blueprint) in self.blueprints.iter().enumerate() {
            layers[blueprint.layer].push(id);
        }
        layers
    }

    fn shared(&mut self, signature: Signature, build: impl FnOnce(&mut Self) -> NodeKind<Sc>) -> usize {
        if let Some(&id) = self.cache.get(&signature) {
            self.shared_hits += 1;
            return id;
        }
        let kind = build(self);
        let id = self.push(kind, signature.parents.clone());
        self.cache.insert(signature, id);
        id
    }

    fn push(&mut self, kind: NodeKind<Sc>, parents: SmallVec<[usize; 2]>) -> usize {
        let id = self.blueprints.len();
        let layer = parents
            .iter()
            .map(|&p| self.blueprints[p].layer + 1)
            .max()
            .unwrap_or(0);
        for (position, &parent) in parents.iter().enumerate() {
            let input = if position == 0 { Input::Left } else { Input::Right };
            self.children[parent].push(Edge { node: id, input });
        }
        self.blueprints.push(Blueprint {
            kind,
            parents,
            layer,
        });
        self.children.push(Vec::new());
        self.store_sizes.push(0);
        id
    }

    /// The producer whose tuples arrive at children of `id`.
    pub(crate) fn tuple_source(&self, mut id: usize) -> usize {
        while self.blueprints[id].kind.forwards_input() {
            id = self.blueprints[id].parents[0];
        }
        id
    }

    /// Reserves `count` consecutive slots on the tuples a child of `parent`
    /// receives and returns the first.
    fn reserve(&mut self, parent: usize, count: usize) -> usize {
        let owner = self.tuple_source(parent);
        let first = self.store_sizes[owner];
        self.store_sizes[owner] += count;
        first
    }

    /// Reserves the key and link slots of one join or exists input. Returns
    /// the first reserved slot as well, for callers that reserve extras.
    fn side(
        &mut self,
        parent: usize,
        keys: KeyExtractor,
        range: Option<Comparison>,
        count: usize,
    ) -> (SideLayout, usize) {
        let base = self.reserve(parent, count);
        (
            SideLayout {
                keys,
                range,
                key_slot: base,
                links_slot: base + 1,
            },
            base,
        )
    }
}

/// A joiner split per node input. `range` is the left side's comparison;
/// the right side stores its values under the flipped one.
struct Lowered {
    left: KeyExtractor,
    right: KeyExtractor,
    range: Option<Comparison>,
    filters: Vec<PairPredicate>,
}

fn lower(joiner: &JoinerDef) -> Lowered {
    fn fns<F: Clone>(ops: &[Operand<F>]) -> Vec<F> {
        ops.iter().map(|op| op.f.clone()).collect()
    }
    let range = joiner.range.as_ref();
    Lowered {
        left: KeyExtractor {
            equal: fns(&joiner.left_keys),
            range: range.map(|r| r.left.f.clone()),
        },
        right: KeyExtractor {
            equal: fns(&joiner.right_keys),
            range: range.map(|r| r.right.f.clone()),
        },
        range: range.map(|r| r.op),
        filters: fns(&joiner.filters),
    }
}
