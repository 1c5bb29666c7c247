//! Optional per-impact trace hook.

use std::fmt;

use solverforge_core::ConstraintRef;

use crate::fact::FactRef;

/// A score change observed by a session trace callback.
#[derive(Debug)]
pub enum TraceEvent<'a, Sc> {
    /// A match was scored.
    Impact {
        constraint: &'a ConstraintRef,
        delta: Sc,
        facts: &'a [FactRef],
    },
    /// A previously scored match was reversed.
    Undo {
        constraint: &'a ConstraintRef,
        delta: Sc,
    },
}

impl<Sc> TraceEvent<'_, Sc> {
    pub fn constraint(&self) -> &ConstraintRef {
        match self {
            TraceEvent::Impact { constraint, .. } | TraceEvent::Undo { constraint, .. } => {
                constraint
            }
        }
    }
}

impl<Sc: fmt::Display> fmt::Display for TraceEvent<'_, Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Impact {
                constraint,
                delta,
                facts,
            } => write!(f, "impact {} {} {:?}", constraint, delta, facts),
            TraceEvent::Undo { constraint, delta } => write!(f, "undo {} {}", constraint, delta),
        }
    }
}

/// Callback installed with [`Session::set_trace`](super::Session::set_trace).
pub type TraceFn<Sc> = Box<dyn FnMut(&TraceEvent<'_, Sc>) + Send>;
