//! Configuration for SolverForge scoring sessions.
//!
//! Load session configuration from TOML or YAML to switch consistency
//! assertions, match tracking and constraint weights without code changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use solverforge_config::{EnvironmentMode, SessionConfig};
//!
//! let config = SessionConfig::from_toml_str(r#"
//!     environment_mode = "fast_assert"
//!     assert_interval = 50
//!     constraint_match_enabled = true
//!
//!     [constraint_weights]
//!     "rostering/Overlap" = "-10hard/0soft"
//! "#).unwrap();
//!
//! assert_eq!(config.environment_mode, EnvironmentMode::FastAssert);
//! assert_eq!(config.assert_interval, 50);
//! assert_eq!(config.constraint_weights.len(), 1);
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use solverforge_config::SessionConfig;
//!
//! let config = SessionConfig::load("scoring.toml").unwrap_or_default();
//! assert!(!config.constraint_match_enabled);
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use solverforge_core::SolverForgeError;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for SolverForgeError {
    fn from(err: ConfigError) -> Self {
        SolverForgeError::Config(err.to_string())
    }
}

fn default_assert_interval() -> u64 {
    100
}

/// Configuration of one scoring session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionConfig {
    /// Which consistency assertions run after a settle.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Settles between two from-scratch checks in `fast_assert` mode.
    #[serde(default = "default_assert_interval")]
    pub assert_interval: u64,

    /// Keep every live match with its facts, for explanations and
    /// indictments. Doubles the bookkeeping cost.
    #[serde(default)]
    pub constraint_match_enabled: bool,

    /// Weight overrides in score string form, keyed by bare or fully
    /// qualified constraint name.
    #[serde(default)]
    pub constraint_weights: BTreeMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            environment_mode: EnvironmentMode::default(),
            assert_interval: default_assert_interval(),
            constraint_match_enabled: false,
            constraint_weights: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML or
    /// fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assert_interval == 0 {
            return Err(ConfigError::Invalid(
                "assert_interval must be at least 1".to_string(),
            ));
        }
        if let Some(name) = self.constraint_weights.keys().find(|n| n.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "constraint weight with empty name {:?}",
                name
            )));
        }
        Ok(())
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_assert_interval(mut self, interval: u64) -> Self {
        self.assert_interval = interval;
        self
    }

    pub fn with_constraint_match_enabled(mut self, enabled: bool) -> Self {
        self.constraint_match_enabled = enabled;
        self
    }

    /// Overrides the weight of one constraint, e.g. `("Overlap", "-5")`.
    pub fn with_constraint_weight(
        mut self,
        name: impl Into<String>,
        weight: impl Into<String>,
    ) -> Self {
        self.constraint_weights.insert(name.into(), weight.into());
        self
    }

    /// Whether a from-scratch check is due after the `settles`-th settle.
    pub fn assertion_due(&self, settles: u64) -> bool {
        match self.environment_mode {
            EnvironmentMode::Reproducible => false,
            EnvironmentMode::FastAssert => settles % self.assert_interval.max(1) == 0,
            EnvironmentMode::FullAssert => true,
        }
    }
}

/// Environment mode: how much consistency checking a session does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Deterministic and unchecked.
    #[default]
    Reproducible,

    /// From-scratch check every `assert_interval` settles.
    FastAssert,

    /// From-scratch check after every settle.
    FullAssert,
}

impl EnvironmentMode {
    /// Returns true if this mode runs any consistency assertion.
    pub fn is_asserted(&self) -> bool {
        !matches!(self, EnvironmentMode::Reproducible)
    }
}
