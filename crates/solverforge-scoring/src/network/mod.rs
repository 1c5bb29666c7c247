//! Compiled, immutable node networks.
//!
//! A [`CompiledNetwork`] is the read-only half of scoring: node structure,
//! slot layout, layers and constraint weights. Any number of
//! [`Session`](crate::Session)s can share one through an `Arc`; each session
//! instantiates its own live nodes from the blueprints.

mod blueprint;
mod compiler;

#[cfg(test)]
mod tests;

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use solverforge_config::SessionConfig;
use solverforge_core::{ConstraintRef, ParseableScore, Score};

use crate::api::{ConstraintWeightOverrides, WeightProvider};
use crate::error::{Result, ScoringError};
use crate::node::{Edge, Node};
use crate::stream::Constraint;

use blueprint::{Blueprint, NodeKind};
use compiler::Compiler;

/// The node graph of a set of constraints.
///
/// # Example
///
/// ```
/// use solverforge_core::SimpleScore;
/// use solverforge_scoring::stream::ConstraintFactory;
/// use solverforge_scoring::CompiledNetwork;
///
/// #[derive(Debug)]
/// struct Visit { day: u32 }
///
/// let factory = ConstraintFactory::new();
/// let weekend = |v: &Visit| v.day >= 5;
/// let a = factory.for_each::<Visit>().filter(weekend)
///     .penalize(SimpleScore::ONE).as_constraint("Weekend");
/// let b = factory.for_each::<Visit>().filter(weekend)
///     .reward(SimpleScore::of(2)).as_constraint("Weekend bonus");
///
/// let network = CompiledNetwork::build([a, b]).unwrap();
/// // one source, one shared filter, two scorers
/// assert_eq!(network.node_count(), 4);
/// assert!(network.shares_node("Weekend", "Weekend bonus"));
/// ```
pub struct CompiledNetwork<Sc: Score> {
    blueprints: Vec<Blueprint<Sc>>,
    children: Vec<Vec<Edge>>,
    layers: Vec<Vec<usize>>,
    store_sizes: Vec<usize>,
    sources: HashMap<TypeId, usize>,
    constraints: Vec<(ConstraintRef, Sc)>,
    scorers: Vec<usize>,
    culled: Vec<ConstraintRef>,
    shared_hits: usize,
}

impl<Sc: Score> CompiledNetwork<Sc> {
    /// Compiles constraints with their declared weights.
    pub fn build(constraints: impl IntoIterator<Item = Constraint<Sc>>) -> Result<Self> {
        Self::build_with_weights(constraints, &ConstraintWeightOverrides::new())
    }

    /// Compiles constraints, taking each weight from `weights` when it has
    /// one under the full or the bare constraint name.
    ///
    /// Constraints whose effective weight is zero are culled and contribute
    /// no nodes.
    pub fn build_with_weights<W>(
        constraints: impl IntoIterator<Item = Constraint<Sc>>,
        weights: &W,
    ) -> Result<Self>
    where
        W: WeightProvider<Sc> + ?Sized,
    {
        let constraints: Vec<Constraint<Sc>> = constraints.into_iter().collect();

        let mut names = HashSet::new();
        for constraint in &constraints {
            let name = constraint.constraint.full_name();
            if !names.insert(name.clone()) {
                return Err(ScoringError::DuplicateConstraint(name));
            }
        }

        let mut compiler = Compiler::new();
        let mut kept = Vec::new();
        let mut scorers = Vec::new();
        let mut culled = Vec::new();
        for constraint in &constraints {
            let cref = &constraint.constraint;
            let weight = weights.weight_for(cref).unwrap_or(constraint.weight);
            if weight.is_zero() {
                debug!(event = "constraint_culled", constraint = %cref);
                culled.push(cref.clone());
                continue;
            }

            let parent = compiler.stream(&constraint.stream);
            let scorer = compiler.scorer(
                parent,
                kept.len(),
                weight,
                constraint.impact,
                constraint.match_weight.as_ref().map(|m| m.f.clone()),
            );
            scorers.push(scorer);
            kept.push((cref.clone(), weight));
        }

        let layers = compiler.layers();
        debug!(
            event = "network_compiled",
            node_count = compiler.blueprints.len(),
            shared_node_hits = compiler.shared_hits,
            layer_count = layers.len(),
            constraint_count = kept.len(),
            culled_count = culled.len(),
        );

        Ok(Self {
            blueprints: compiler.blueprints,
            children: compiler.children,
            layers,
            store_sizes: compiler.store_sizes,
            sources: compiler.sources,
            constraints: kept,
            scorers,
            culled,
            shared_hits: compiler.shared_hits,
        })
    }

    pub fn node_count(&self) -> usize {
        self.blueprints.len()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Number of distinct fact types read by any constraint.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Compiled constraints, in declaration order.
    pub fn constraint_refs(&self) -> impl Iterator<Item = &ConstraintRef> + '_ {
        self.constraints.iter().map(|(cref, _)| cref)
    }

    /// Effective weight of a compiled constraint.
    pub fn constraint_weight(&self, name: &str) -> Option<Sc> {
        self.constraints
            .iter()
            .find(|(cref, _)| cref.matches_name(name))
            .map(|(_, weight)| *weight)
    }

    /// Constraints dropped because their effective weight was zero.
    pub fn culled_constraints(&self) -> &[ConstraintRef] {
        &self.culled
    }

    /// How many sub-expressions reused an existing node.
    pub fn shared_node_hits(&self) -> usize {
        self.shared_hits
    }

    /// Node id feeding the scorer of the named constraint.
    pub fn scorer_parent(&self, name: &str) -> Option<usize> {
        let index = self
            .constraints
            .iter()
            .position(|(cref, _)| cref.matches_name(name))?;
        self.blueprints[self.scorers[index]].parents.first().copied()
    }

    /// Returns true when both constraints score tuples from one physical
    /// node.
    pub fn shares_node(&self, a: &str, b: &str) -> bool {
        match (self.scorer_parent(a), self.scorer_parent(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Short kind name of a node, such as `"join"`.
    pub fn node_label(&self, id: usize) -> Option<&'static str> {
        self.blueprints.get(id).map(|b| b.kind.label())
    }

    /// Parent node ids, left input first.
    pub fn parents(&self, id: usize) -> &[usize] {
        self.blueprints.get(id).map_or(&[], |b| &b.parents)
    }

    pub fn layer_of(&self, id: usize) -> Option<usize> {
        self.blueprints.get(id).map(|b| b.layer)
    }

    /// Node id of the source for fact type `T`, if any constraint reads it.
    pub fn source_of<T: 'static>(&self) -> Option<usize> {
        self.sources.get(&TypeId::of::<T>()).copied()
    }

    pub(crate) fn source_for(&self, fact_type: TypeId) -> Option<usize> {
        self.sources.get(&fact_type).copied()
    }

    pub(crate) fn children(&self) -> &[Vec<Edge>] {
        &self.children
    }

    pub(crate) fn layers(&self) -> &[Vec<usize>] {
        &self.layers
    }

    pub(crate) fn constraints(&self) -> &[(ConstraintRef, Sc)] {
        &self.constraints
    }

    /// Fresh live nodes for one session.
    pub(crate) fn instantiate(&self) -> Vec<Box<dyn Node<Sc>>> {
        self.blueprints
            .iter()
            .zip(&self.store_sizes)
            .map(|(blueprint, &store_size)| blueprint.instantiate(store_size))
            .collect()
    }
}

impl<Sc: ParseableScore> CompiledNetwork<Sc> {
    /// Compiles constraints with the weight overrides of a session config.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::InvalidWeight`] if a weight string does not
    /// parse as `Sc`.
    pub fn build_with_config(
        constraints: impl IntoIterator<Item = Constraint<Sc>>,
        config: &SessionConfig,
    ) -> Result<Self> {
        let overrides = ConstraintWeightOverrides::from_score_strings(&config.constraint_weights)?;
        Self::build_with_weights(constraints, &overrides)
    }
}

impl<Sc: Score> std::fmt::Debug for CompiledNetwork<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources: Vec<&'static str> = self
            .blueprints
            .iter()
            .filter_map(|b| match b.kind {
                NodeKind::Source { type_name } => Some(type_name),
                _ => None,
            })
            .collect();
        f.debug_struct("CompiledNetwork")
            .field("nodes", &self.blueprints.len())
            .field("layers", &self.layers.len())
            .field("sources", &sources)
            .field("constraints", &self.constraints.len())
            .finish()
    }
}
