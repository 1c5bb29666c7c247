//! SolverForge Core - shared vocabulary of the incremental scoring engine
//!
//! This crate provides the types every other SolverForge crate speaks:
//! - Score types for representing solution quality
//! - Constraint identifiers and impact direction
//! - The crate-wide error type

pub mod constraint;
pub mod error;
pub mod score;

pub use constraint::{ConstraintRef, ImpactType};
pub use error::{Result, SolverForgeError};
pub use score::{HardSoftScore, ParseableScore, Score, ScoreLevel, ScoreParseError, SimpleScore};
