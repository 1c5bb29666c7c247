//! Score types.
//!
//! Scores are immutable values with exact integer arithmetic, so an
//! incrementally maintained total can be compared bit for bit against a
//! from-scratch recomputation.

#[macro_use]
mod macros;

mod hard_soft;
mod simple;
mod traits;

#[cfg(test)]
mod tests;

pub use hard_soft::HardSoftScore;
pub use simple::SimpleScore;
pub use traits::{ParseableScore, Score, ScoreParseError};

/// Meaning of one score level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreLevel {
    /// Feasibility: any negative value makes a solution infeasible.
    Hard,
    /// Optimization objective.
    Soft,
}
