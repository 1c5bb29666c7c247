//! Read-side API of a scoring session.
//!
//! This module provides:
//! - Analysis types for score explanation and indictments
//! - Per-constraint results
//! - Compile-time weight overrides

pub mod analysis;
pub mod weight_overrides;

#[cfg(test)]
mod analysis_tests;


pub use analysis::{
    ConstraintAnalysis, ConstraintJustification, ConstraintResult, DetailedConstraintMatch,
    EntityRef, Indictment, IndictmentMap, ScoreExplanation,
};
pub use weight_overrides::{ConstraintWeightOverrides, WeightProvider};
