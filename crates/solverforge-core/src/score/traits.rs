//! The `Score` trait and score parsing.

use std::fmt::{Debug, Display};
use std::ops::{Add, Neg, Sub};

use super::ScoreLevel;

/// A multi-level score.
///
/// Sessions add one delta per constraint match and subtract the same delta
/// when the match goes away, so the arithmetic must be exact: a score
/// built up and torn down again returns to [`zero`](Self::zero) bit for
/// bit. Higher-priority levels dominate comparisons.
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + Eq
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// The identity of addition.
    fn zero() -> Self;

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// True when the highest-priority level is not negative.
    fn is_feasible(&self) -> bool;

    fn levels_count() -> usize;

    /// Level values, highest priority first.
    fn to_level_numbers(&self) -> Vec<i64>;

    /// What the level at `index` means, or `None` past the last level.
    fn level_label(index: usize) -> Option<ScoreLevel>;

    /// Multiplies every level by an integer match weight.
    fn scale(&self, factor: i64) -> Self;
}

/// Scores that can be read back from text, e.g. a weight override in a
/// config file.
///
/// `SimpleScore` reads `"-3"`; `HardSoftScore` reads `"-1hard/-20soft"`.
pub trait ParseableScore: Score {
    fn parse(s: &str) -> Result<Self, ScoreParseError>;

    /// The form `parse` accepts.
    fn to_string_repr(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreParseError {
    pub message: String,
}

impl std::fmt::Display for ScoreParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Score parse error: {}", self.message)
    }
}

impl std::error::Error for ScoreParseError {}
