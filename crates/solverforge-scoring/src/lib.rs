//! Incremental node-network constraint scoring for SolverForge.
//!
//! This crate turns declarative constraint streams into a network of
//! propagation nodes and keeps a score up to date as facts change:
//! - Typed constraint streams ([`stream::ConstraintFactory`], [`stream::UniStream`], ...)
//! - A hash-consing compiler with node sharing ([`CompiledNetwork`])
//! - Batched, layered propagation sessions ([`Session`])
//! - Score analysis: per-constraint results, matches and indictments
//!
//! # Architecture
//!
//! Stream handles are typed; the network underneath is not. Nodes hold
//! erased closures over [`Facts`] and tuples live in a generational arena,
//! so one compiled network can serve any number of sessions.

// Erased closure aliases are spelled out in full where they are defined
#![allow(clippy::type_complexity)]

pub mod api;
pub mod error;
pub mod fact;
pub mod index;
pub mod network;
pub(crate) mod node;
pub mod session;
pub mod stream;
pub mod tuple;

pub use api::{
    ConstraintAnalysis, ConstraintJustification, ConstraintResult, ConstraintWeightOverrides,
    DetailedConstraintMatch, EntityRef, Indictment, IndictmentMap, ScoreExplanation,
    WeightProvider,
};
pub use error::{Result, ScoreDivergence, ScoringError};
pub use fact::{Fact, FactKey, FactRef, Facts};
pub use index::{DynKey, IndexKey, RangeValue};
pub use network::CompiledNetwork;
pub use session::{Session, TraceEvent, TraceFn, UndoScoreImpacter};
pub use tuple::{TupleId, TupleState};
