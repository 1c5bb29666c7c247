//! Constraint identification and impact direction.

use std::fmt;

use crate::score::Score;

/// Reference to a constraint for identification.
///
/// Ordering is by package, then name, which gives reports a stable order.
///
/// # Example
///
/// ```
/// use solverforge_core::ConstraintRef;
///
/// let cr = ConstraintRef::new("scheduling", "NoOverlap");
/// assert_eq!(cr.full_name(), "scheduling/NoOverlap");
///
/// let simple = ConstraintRef::new("", "Simple");
/// assert_eq!(simple.full_name(), "Simple");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintRef {
    /// Package/module containing the constraint.
    pub package: String,
    /// Name of the constraint.
    pub name: String,
}

impl ConstraintRef {
    /// Creates a new constraint reference.
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Returns the fully qualified name.
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.package, self.name)
        }
    }

    /// Returns true if `name` is either the bare or the qualified name.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name == name || self.full_name() == name
    }
}

impl fmt::Display for ConstraintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Type of impact a constraint has on the score.
///
/// # Example
///
/// ```
/// use solverforge_core::{HardSoftScore, ImpactType};
///
/// let weight = HardSoftScore::ONE_HARD;
/// assert_eq!(ImpactType::Penalty.apply(weight, 3), HardSoftScore::of_hard(-3));
/// assert_eq!(ImpactType::Reward.apply(weight, 3), HardSoftScore::of_hard(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactType {
    /// Penalize (subtract from score).
    Penalty,
    /// Reward (add to score).
    Reward,
}

impl ImpactType {
    /// Signed contribution of one match with the given match weight.
    pub fn apply<S: Score>(self, weight: S, match_weight: i64) -> S {
        let scaled = weight.scale(match_weight);
        match self {
            ImpactType::Penalty => -scaled,
            ImpactType::Reward => scaled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::SimpleScore;

    #[test]
    fn test_constraint_ref_full_name() {
        let cr = ConstraintRef::new("my.package", "TestConstraint");
        assert_eq!(cr.full_name(), "my.package/TestConstraint");
        assert_eq!(cr.to_string(), "my.package/TestConstraint");
    }

    #[test]
    fn test_constraint_ref_empty_package() {
        let cr = ConstraintRef::new("", "Simple");
        assert_eq!(cr.full_name(), "Simple");
    }

    #[test]
    fn test_matches_name() {
        let cr = ConstraintRef::new("pkg", "Overlap");
        assert!(cr.matches_name("Overlap"));
        assert!(cr.matches_name("pkg/Overlap"));
        assert!(!cr.matches_name("other/Overlap"));
    }

    #[test]
    fn test_impact_sign() {
        let w = SimpleScore::of(2);
        assert_eq!(ImpactType::Penalty.apply(w, 5), SimpleScore::of(-10));
        assert_eq!(ImpactType::Reward.apply(w, 5), SimpleScore::of(10));
        assert_eq!(ImpactType::Penalty.apply(w, 0), SimpleScore::of(0));
    }
}
