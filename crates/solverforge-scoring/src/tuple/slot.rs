use std::any::Any;
use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::index::IndexKey;
use crate::session::UndoScoreImpacter;

use super::TupleId;

/// Per-node scratch storage on a tuple.
///
/// Each node reserves its slot indices when the network is compiled and is
/// the only reader and writer of them.
pub(crate) enum Slot<Sc> {
    Empty,
    /// Pass/fail of a filter, or whether an exists node forwards the tuple.
    Flag(bool),
    /// Cached join, exists, or group key.
    Key(IndexKey),
    /// Single derived tuple (map output).
    Tuple(TupleId),
    /// Owned or matched tuples (flatten outputs, exists matches).
    Tuples(IndexSet<TupleId>),
    /// Join partner to combined tuple.
    Pairs(IndexMap<TupleId, TupleId>),
    /// Collector undo token.
    Token(Box<dyn Any + Send>),
    /// Score undo handle.
    Impact(UndoScoreImpacter<Sc>),
}

impl<Sc> Slot<Sc> {
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Slot::Empty => "empty",
            Slot::Flag(_) => "flag",
            Slot::Key(_) => "key",
            Slot::Tuple(_) => "tuple",
            Slot::Tuples(_) => "tuples",
            Slot::Pairs(_) => "pairs",
            Slot::Token(_) => "token",
            Slot::Impact(_) => "impact",
        }
    }
}

impl<Sc> fmt::Debug for Slot<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Flag(b) => write!(f, "Flag({})", b),
            Slot::Key(k) => write!(f, "Key({:?})", k),
            Slot::Tuple(t) => write!(f, "Tuple({:?})", t),
            Slot::Tuples(s) => write!(f, "Tuples({})", s.len()),
            Slot::Pairs(p) => write!(f, "Pairs({})", p.len()),
            other => f.write_str(other.kind()),
        }
    }
}
