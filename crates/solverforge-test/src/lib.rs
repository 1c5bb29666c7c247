//! Shared test fixtures for SolverForge crates.
//!
//! This crate provides fact types and from-scratch reference calculations
//! for testing. It does NOT depend on `solverforge-scoring` to avoid
//! circular dependencies.
//!
//! Planning variables sit behind atomics: sessions identify facts by
//! allocation, so a test mutates a fact in place and reports an update.
//!
//! - [`nqueens`] - Queens with a mutable row and a brute-force conflict count
//! - [`task`] - Weighted tasks grouped by project
//! - [`roster`] - Shifts and employees for join and exists tests
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! solverforge-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```
//! use solverforge_test::nqueens::{board, conflict_score};
//!
//! let queens = board(&[0, 2, 1, 3]);
//! assert_eq!(conflict_score(&queens).score(), -2);
//! ```

pub mod nqueens;
pub mod roster;
pub mod task;

pub use nqueens::Queen;
pub use roster::{Employee, Shift};
pub use task::Task;
