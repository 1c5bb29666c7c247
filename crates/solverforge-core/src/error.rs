//! Error types for SolverForge

use thiserror::Error;

use crate::score::ScoreParseError;

/// Umbrella error for callers that drive several SolverForge crates.
///
/// The scoring and config crates have their own precise error enums and
/// convert into this one, so an application can use a single `?` chain.
#[derive(Debug, Error)]
pub enum SolverForgeError {
    /// Error in session or network configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A score string could not be parsed
    #[error(transparent)]
    ScoreParse(#[from] ScoreParseError),

    /// The caller violated the scoring session contract
    #[error("Scoring usage error: {0}")]
    Usage(String),

    /// The incremental network detected an internal inconsistency
    #[error("Scoring corruption: {0}")]
    Corruption(String),
}

impl SolverForgeError {
    /// Returns true if the error indicates a defect rather than bad input.
    pub fn is_corruption(&self) -> bool {
        matches!(self, SolverForgeError::Corruption(_))
    }
}

/// Result type alias for SolverForge operations
pub type Result<T> = std::result::Result<T, SolverForgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{ParseableScore, SimpleScore};

    #[test]
    fn test_score_parse_converts() {
        fn parse(s: &str) -> Result<SimpleScore> {
            Ok(SimpleScore::parse(s)?)
        }

        let err = parse("abc").unwrap_err();
        assert!(matches!(err, SolverForgeError::ScoreParse(_)));
        assert!(!err.is_corruption());
    }

    #[test]
    fn test_corruption_classification() {
        assert!(SolverForgeError::Corruption("stale tuple".into()).is_corruption());
        assert!(!SolverForgeError::Usage("duplicate fact".into()).is_corruption());
    }
}
