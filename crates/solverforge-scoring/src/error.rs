//! Error types for the scoring session and node network.

use thiserror::Error;

use solverforge_core::SolverForgeError;

use crate::tuple::{TupleId, TupleState};

/// One constraint whose incremental total disagrees with a from-scratch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreDivergence {
    pub constraint: String,
    pub incremental: String,
    pub from_scratch: String,
}

impl std::fmt::Display for ScoreDivergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (incremental {}, from scratch {})",
            self.constraint, self.incremental, self.from_scratch
        )
    }
}

/// Errors raised by a [`Session`](crate::Session) or while compiling a network.
///
/// Usage errors mean the caller broke the event contract. Corruption errors
/// mean the network itself is inconsistent; once one is raised inside
/// `settle()` the session refuses further work.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The fact was inserted while already live.
    #[error("Fact {fact} is already inserted")]
    DuplicateFact { fact: String },

    /// The fact was updated or retracted without being live.
    #[error("Fact {fact} is not inserted")]
    UnknownFact { fact: String },

    /// The score was read before the event queue was drained.
    #[error("Score requested with {count} pending event(s); call settle() first")]
    PendingEvents { count: usize },

    /// Match-level analysis was requested without opting in.
    #[error("Constraint match tracking is disabled for this session")]
    ConstraintMatchDisabled,

    /// Two constraints share a fully qualified name.
    #[error("Duplicate constraint name: {0}")]
    DuplicateConstraint(String),

    /// A weight override string did not parse.
    #[error("Invalid weight for constraint {constraint}: {message}")]
    InvalidWeight { constraint: String, message: String },

    /// A previous settle failed; the session state is unusable.
    #[error("Session is poisoned by an earlier failure")]
    SessionPoisoned,

    /// An indexer was asked to remove an entry it never held.
    #[error("Index corruption: tuple {tuple:?} not found under key {key}")]
    IndexCorruption { tuple: TupleId, key: String },

    /// A tuple id points at a released or reused arena entry.
    #[error("Stale tuple reference {0:?}")]
    StaleTuple(TupleId),

    /// A store slot did not hold what its owning node expected.
    #[error("Store slot {slot} of tuple {tuple:?}: expected {expected}")]
    SlotCorruption {
        tuple: TupleId,
        slot: usize,
        expected: &'static str,
    },

    /// A lifecycle transition that the propagation protocol forbids.
    #[error("Impossible {action} of tuple {tuple:?} in state {state:?}")]
    ImpossibleState {
        tuple: TupleId,
        state: TupleState,
        action: &'static str,
    },

    /// A scored tuple was retracted without a stored undo handle.
    #[error("No undo handle stored for tuple {0:?}")]
    MissingUndo(TupleId),

    /// Incremental and from-scratch totals disagree.
    #[error("Score corruption in {} constraint(s): {}", divergences.len(), join_divergences(divergences))]
    ScoreCorruption { divergences: Vec<ScoreDivergence> },
}

fn join_divergences(divergences: &[ScoreDivergence]) -> String {
    divergences
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ScoringError {
    /// Returns true for errors that indicate a defect in the network or in
    /// event generation, as opposed to a caller contract violation.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            ScoringError::IndexCorruption { .. }
                | ScoringError::StaleTuple(_)
                | ScoringError::SlotCorruption { .. }
                | ScoringError::ImpossibleState { .. }
                | ScoringError::MissingUndo(_)
                | ScoringError::ScoreCorruption { .. }
        )
    }
}

impl From<ScoringError> for SolverForgeError {
    fn from(err: ScoringError) -> Self {
        if err.is_corruption() {
            SolverForgeError::Corruption(err.to_string())
        } else {
            SolverForgeError::Usage(err.to_string())
        }
    }
}

/// Result type alias for scoring operations.
pub type Result<T> = std::result::Result<T, ScoringError>;
