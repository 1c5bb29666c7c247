//! Node types and the tuple propagation protocol.
//!
//! Nodes fall into two groups:
//! - *producers* (source, map, flatten-last, join, concat, group) create
//!   their own output tuples, queue lifecycle changes on them, and release
//!   the queue layer by layer in [`Node::propagate`];
//! - *forwarders* (filter, exists) pass their input tuple through unchanged
//!   and signal their children immediately; the scorer is terminal.
//!
//! Nodes never call each other. Every operation writes the signals it
//! forwards into `out`, and [`deliver`] routes them to the children.

mod concat;
mod exists;
mod filter;
mod flatten;
mod functions;
mod group;
mod join;
mod map;
mod queue;
mod scorer;
mod source;


use solverforge_core::Score;

use crate::error::Result;
use crate::session::ScoreInliner;
use crate::tuple::{TupleArena, TupleId};

pub(crate) use concat::ConcatNode;
pub(crate) use exists::{ExistsNode, ExistsSide};
pub(crate) use filter::FilterNode;
pub(crate) use flatten::FlattenLastNode;
pub(crate) use functions::{
    compute_key, FlattenFn, KeyExtractor, KeyFn, MapFn, Mapper, PairPredicate, Predicate, RangeFn,
    SameFn, WeightFn,
};
pub(crate) use group::GroupNode;
pub(crate) use join::{JoinNode, JoinSide};
pub(crate) use map::MapNode;
pub(crate) use queue::PropagationQueue;
pub(crate) use scorer::ScorerNode;
pub(crate) use source::SourceNode;

/// Which parent a signal arrived from. Single-input nodes only see `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Input {
    Left,
    Right,
}

/// A lifecycle call forwarded from a node to its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    Insert(TupleId),
    Update(TupleId),
    Retract(TupleId),
}

/// Sub-step of one layer; all retracts go first, inserts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Retract,
    Update,
    Insert,
}

impl Phase {
    pub(crate) const ALL: [Phase; 3] = [Phase::Retract, Phase::Update, Phase::Insert];
}

/// Child edge of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edge {
    pub(crate) node: usize,
    pub(crate) input: Input,
}

/// Mutable state shared by all nodes of one session.
pub(crate) struct Runtime<Sc: Score> {
    pub(crate) arena: TupleArena<Sc>,
    pub(crate) inliner: ScoreInliner<Sc>,
}

pub(crate) trait Node<Sc: Score>: Send {
    fn insert(
        &mut self,
        input: Input,
        tuple: TupleId,
        rt: &mut Runtime<Sc>,
        out: &mut Vec<Signal>,
    ) -> Result<()>;

    fn update(
        &mut self,
        input: Input,
        tuple: TupleId,
        rt: &mut Runtime<Sc>,
        out: &mut Vec<Signal>,
    ) -> Result<()>;

    fn retract(
        &mut self,
        input: Input,
        tuple: TupleId,
        rt: &mut Runtime<Sc>,
        out: &mut Vec<Signal>,
    ) -> Result<()>;

    /// Releases queued changes of one phase. Only producers queue.
    fn propagate(
        &mut self,
        _phase: Phase,
        _rt: &mut Runtime<Sc>,
        _out: &mut Vec<Signal>,
    ) -> Result<()> {
        Ok(())
    }

    fn as_source(&mut self) -> Option<&mut SourceNode> {
        None
    }
}

/// Routes `signal`, emitted by node `from`, to every child of `from`, and
/// recursively through forwarding children.
pub(crate) fn deliver<Sc: Score>(
    nodes: &mut [Box<dyn Node<Sc>>],
    children: &[Vec<Edge>],
    rt: &mut Runtime<Sc>,
    from: usize,
    signal: Signal,
) -> Result<()> {
    for edge in &children[from] {
        let mut emitted = Vec::new();
        let node = &mut nodes[edge.node];
        match signal {
            Signal::Insert(t) => node.insert(edge.input, t, rt, &mut emitted)?,
            Signal::Update(t) => node.update(edge.input, t, rt, &mut emitted)?,
            Signal::Retract(t) => node.retract(edge.input, t, rt, &mut emitted)?,
        }
        for next in emitted {
            deliver(nodes, children, rt, edge.node, next)?;
        }
    }
    Ok(())
}

/// One settle pass: every layer in order, and within a layer each phase
/// across all of its nodes before the next phase starts.
///
/// Signals emitted from `propagate` come from producers, which own their
/// tuples, so a retracted tuple is released once its children have seen it.
pub(crate) fn settle<Sc: Score>(
    nodes: &mut [Box<dyn Node<Sc>>],
    children: &[Vec<Edge>],
    layers: &[Vec<usize>],
    rt: &mut Runtime<Sc>,
) -> Result<()> {
    let mut emitted = Vec::new();
    for layer in layers {
        for phase in Phase::ALL {
            for &id in layer {
                nodes[id].propagate(phase, rt, &mut emitted)?;
                for signal in emitted.drain(..) {
                    deliver(nodes, children, rt, id, signal)?;
                    if let Signal::Retract(t) = signal {
                        rt.arena.release(t)?;
                    }
                }
            }
        }
    }
    Ok(())
}
