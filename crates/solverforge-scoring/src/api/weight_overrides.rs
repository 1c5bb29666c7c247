// Compile-time constraint weight overrides.
//
// An override replaces the declared weight of a constraint when a network
// is compiled, so one set of constraint definitions can be scored under
// several weightings. A zero override culls the constraint.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use solverforge_core::{ConstraintRef, ParseableScore, Score};

use crate::error::{Result, ScoringError};

/// Weights keyed by constraint name, bare (`Overlap`) or qualified
/// (`rostering/Overlap`).
#[derive(Clone)]
pub struct ConstraintWeightOverrides<Sc: Score> {
    weights: IndexMap<String, Sc>,
}

impl<Sc: Score> ConstraintWeightOverrides<Sc> {
    pub fn new() -> Self {
        ConstraintWeightOverrides {
            weights: IndexMap::new(),
        }
    }

    pub fn from_pairs<N: Into<String>>(pairs: impl IntoIterator<Item = (N, Sc)>) -> Self {
        let mut overrides = Self::new();
        for (name, weight) in pairs {
            overrides.put(name, weight);
        }
        overrides
    }

    /// Sets the weight for `name`, replacing any earlier one.
    pub fn put(&mut self, name: impl Into<String>, weight: Sc) {
        self.weights.insert(name.into(), weight);
    }

    pub fn remove(&mut self, name: &str) -> Option<Sc> {
        self.weights.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Sc> {
        self.weights.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.weights.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Sc)> {
        self.weights.iter().map(|(name, weight)| (name.as_str(), *weight))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl<Sc: ParseableScore> ConstraintWeightOverrides<Sc> {
    /// Reads weights written as score text, e.g. `"-1hard/0soft"`, the way
    /// a session config file carries them.
    ///
    /// # Errors
    ///
    /// [`ScoringError::InvalidWeight`] naming the first constraint whose
    /// text does not parse.
    pub fn from_score_strings<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut overrides = Self::new();
        for (name, text) in entries {
            match Sc::parse(text.trim()) {
                Ok(weight) => overrides.put(name.as_str(), weight),
                Err(err) => {
                    return Err(ScoringError::InvalidWeight {
                        constraint: name.clone(),
                        message: err.message,
                    })
                }
            }
        }
        Ok(overrides)
    }
}

impl<Sc: Score> Default for ConstraintWeightOverrides<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc: Score> fmt::Debug for ConstraintWeightOverrides<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.weights.iter().map(|(name, weight)| (name, weight.to_string())))
            .finish()
    }
}

/// Where the network compiler looks up weights.
pub trait WeightProvider<Sc: Score>: Send + Sync {
    fn weight(&self, name: &str) -> Option<Sc>;

    /// Weight for a constraint: the qualified name first, then the bare one.
    fn weight_for(&self, constraint: &ConstraintRef) -> Option<Sc> {
        self.weight(&constraint.full_name())
            .or_else(|| self.weight(&constraint.name))
    }
}

impl<Sc: Score> WeightProvider<Sc> for ConstraintWeightOverrides<Sc> {
    fn weight(&self, name: &str) -> Option<Sc> {
        self.get(name)
    }
}

impl<Sc: Score, W: WeightProvider<Sc> + ?Sized> WeightProvider<Sc> for Arc<W> {
    fn weight(&self, name: &str) -> Option<Sc> {
        (**self).weight(name)
    }
}
