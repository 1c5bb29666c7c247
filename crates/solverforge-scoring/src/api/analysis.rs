//! Explanations of a settled score.
//!
//! A [`ScoreExplanation`] breaks the total down per constraint and per
//! match; an [`IndictmentMap`] turns the same matches around and charges
//! each fact with the matches it takes part in. Facts are compared by
//! identity, so two equal-looking facts are charged separately.
//!
//! Everything here is a snapshot. Maps keep first-seen order, so two
//! sessions fed the same events explain themselves identically.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use solverforge_core::score::Score;
use solverforge_core::ConstraintRef;

use crate::fact::{FactKey, FactRef};

/// A fact named in a match, with its `Debug` text captured at snapshot time.
#[derive(Clone)]
pub struct EntityRef {
    pub type_name: &'static str,
    pub display: String,
    fact: FactRef,
}

impl EntityRef {
    pub fn new(fact: FactRef) -> Self {
        EntityRef {
            type_name: fact.type_name(),
            display: format!("{:?}", fact),
            fact,
        }
    }

    pub fn as_entity<T: 'static>(&self) -> Option<&T> {
        self.fact.downcast_ref()
    }

    pub fn fact(&self) -> &FactRef {
        &self.fact
    }

    pub fn key(&self) -> FactKey {
        self.fact.key()
    }

    /// Type name without its module path, e.g. `Shift`.
    pub fn short_type_name(&self) -> &str {
        match self.type_name.rfind("::") {
            Some(at) => &self.type_name[at + 2..],
            None => self.type_name,
        }
    }
}

impl From<FactRef> for EntityRef {
    fn from(fact: FactRef) -> Self {
        EntityRef::new(fact)
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.short_type_name(), self.display)
    }
}

// Identity, never value.
impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// The facts of a matched tuple, in tuple order.
#[derive(Debug, Clone)]
pub struct ConstraintJustification {
    pub entities: Vec<EntityRef>,
    /// The facts' `Debug` texts joined with `, `.
    pub description: String,
}

impl ConstraintJustification {
    pub fn new(entities: Vec<EntityRef>) -> Self {
        let description = if entities.is_empty() {
            String::from("No entities")
        } else {
            let texts: Vec<&str> = entities.iter().map(|e| e.display.as_str()).collect();
            texts.join(", ")
        };
        ConstraintJustification {
            entities,
            description,
        }
    }

    pub fn from_facts(facts: &[FactRef]) -> Self {
        Self::new(facts.iter().map(|fact| EntityRef::new(fact.clone())).collect())
    }
}

/// One live match and the score it contributes.
#[derive(Debug, Clone)]
pub struct DetailedConstraintMatch<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    pub score: Sc,
    pub justification: ConstraintJustification,
}

impl<Sc: Score> DetailedConstraintMatch<Sc> {
    pub fn new(
        constraint_ref: ConstraintRef,
        score: Sc,
        justification: ConstraintJustification,
    ) -> Self {
        DetailedConstraintMatch {
            constraint_ref,
            score,
            justification,
        }
    }

    fn facts(&self) -> impl Iterator<Item = &EntityRef> {
        self.justification.entities.iter()
    }
}

/// A constraint's share of the score.
#[derive(Debug, Clone)]
pub struct ConstraintAnalysis<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Effective weight after overrides.
    pub weight: Sc,
    pub score: Sc,
    /// In the order the matches were first scored.
    pub matches: Vec<DetailedConstraintMatch<Sc>>,
    pub is_hard: bool,
}

impl<Sc: Score> ConstraintAnalysis<Sc> {
    pub fn new(
        constraint_ref: ConstraintRef,
        weight: Sc,
        score: Sc,
        matches: Vec<DetailedConstraintMatch<Sc>>,
        is_hard: bool,
    ) -> Self {
        ConstraintAnalysis {
            constraint_ref,
            weight,
            score,
            matches,
            is_hard,
        }
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }
}

/// The total score and every constraint that makes it up.
#[derive(Debug, Clone)]
pub struct ScoreExplanation<Sc: Score> {
    pub score: Sc,
    /// In compile order.
    pub constraint_analyses: Vec<ConstraintAnalysis<Sc>>,
}

impl<Sc: Score> ScoreExplanation<Sc> {
    pub fn new(score: Sc, constraint_analyses: Vec<ConstraintAnalysis<Sc>>) -> Self {
        ScoreExplanation {
            score,
            constraint_analyses,
        }
    }

    pub fn total_match_count(&self) -> usize {
        self.constraint_analyses
            .iter()
            .map(ConstraintAnalysis::match_count)
            .sum()
    }

    /// Constraints that currently move the score.
    pub fn non_zero_constraints(&self) -> Vec<&ConstraintAnalysis<Sc>> {
        self.constraint_analyses
            .iter()
            .filter(|analysis| !analysis.score.is_zero())
            .collect()
    }

    pub fn all_matches(&self) -> Vec<&DetailedConstraintMatch<Sc>> {
        let mut all = Vec::with_capacity(self.total_match_count());
        for analysis in &self.constraint_analyses {
            all.extend(analysis.matches.iter());
        }
        all
    }
}

/// Everything charged to one fact.
#[derive(Debug, Clone)]
pub struct Indictment<Sc: Score> {
    pub entity: EntityRef,
    /// Sum of the scores of the matches the fact takes part in.
    pub score: Sc,
    pub constraint_matches: IndexMap<ConstraintRef, Vec<DetailedConstraintMatch<Sc>>>,
}

impl<Sc: Score> Indictment<Sc> {
    pub fn new(entity: EntityRef) -> Self {
        Indictment {
            entity,
            score: Sc::zero(),
            constraint_matches: IndexMap::new(),
        }
    }

    pub fn add_match(&mut self, constraint_match: DetailedConstraintMatch<Sc>) {
        self.score = self.score + constraint_match.score;
        self.constraint_matches
            .entry(constraint_match.constraint_ref.clone())
            .or_default()
            .push(constraint_match);
    }

    pub fn match_count(&self) -> usize {
        self.constraint_matches.values().map(Vec::len).sum()
    }

    /// Constraints the fact is charged under, in first-charged order.
    pub fn violated_constraints(&self) -> Vec<&ConstraintRef> {
        self.constraint_matches.keys().collect()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraint_matches.len()
    }
}

/// Indictments keyed by fact identity.
#[derive(Debug, Clone)]
pub struct IndictmentMap<Sc: Score> {
    pub indictments: IndexMap<EntityRef, Indictment<Sc>>,
}

impl<Sc: Score> IndictmentMap<Sc> {
    pub fn new() -> Self {
        IndictmentMap {
            indictments: IndexMap::new(),
        }
    }

    /// Charges each match to every distinct fact in its tuple. A fact that
    /// fills two slots of one tuple pays once.
    pub fn from_matches(matches: Vec<DetailedConstraintMatch<Sc>>) -> Self {
        let mut map = Self::new();
        for m in matches {
            let mut charged: Vec<FactKey> = Vec::with_capacity(m.justification.entities.len());
            for entity in m.facts() {
                if charged.contains(&entity.key()) {
                    continue;
                }
                charged.push(entity.key());
                map.charge(entity, m.clone());
            }
        }
        map
    }

    fn charge(&mut self, entity: &EntityRef, m: DetailedConstraintMatch<Sc>) {
        self.indictments
            .entry(entity.clone())
            .or_insert_with(|| Indictment::new(entity.clone()))
            .add_match(m);
    }

    pub fn get(&self, entity: &EntityRef) -> Option<&Indictment<Sc>> {
        self.indictments.get(entity)
    }

    pub fn get_fact(&self, fact: &FactRef) -> Option<&Indictment<Sc>> {
        self.get(&EntityRef::new(fact.clone()))
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityRef> {
        self.indictments.keys()
    }

    /// Most negative score first; ties keep first-charged order.
    pub fn worst_entities(&self) -> Vec<&EntityRef> {
        let mut ranked: Vec<&Indictment<Sc>> = self.indictments.values().collect();
        ranked.sort_by(|a, b| a.score.cmp(&b.score));
        ranked.into_iter().map(|indictment| &indictment.entity).collect()
    }

    pub fn len(&self) -> usize {
        self.indictments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indictments.is_empty()
    }
}

impl<Sc: Score> Default for IndictmentMap<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

/// Score and match count of one constraint. Available whether or not
/// matches are tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintResult<Sc> {
    /// `package/name`.
    pub name: String,
    pub score: Sc,
    pub match_count: usize,
    pub is_hard: bool,
}
