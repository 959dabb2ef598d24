//! Solve configuration.
//!
//! Exactly one realization/encoding pair is active per run. The
//! configuration is an explicit immutable value threaded through each
//! call; nothing here is process-wide.
//!
//! # Examples
//!
//! Load configuration from TOML:
//!
//! ```
//! use gradus_solver::SolveConfig;
//! use gradus_solver::{Encoding, Realization};
//!
//! let config = SolveConfig::from_toml_str(r#"
//!     realization = "weight_constraint"
//!     encoding = "ordered"
//!     max_models = 10
//! "#).unwrap();
//! assert_eq!(config.realization, Realization::WeightConstraint);
//! assert_eq!(config.encoding, Encoding::Ordered);
//! assert_eq!(config.limit(), Some(10));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How the quantization constraint is realized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Realization {
    /// Hand-written incremental propagator.
    #[default]
    Native,
    /// Declarative linear comparisons via engine-native sum reasoning.
    WeightConstraint,
}

/// How truth degrees are encoded as atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// One selected-value atom per degree.
    #[default]
    Plain,
    /// Additionally a monotone chain of at-least indicators.
    Ordered,
}

/// A complete solve configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SolveConfig {
    /// Active realization.
    pub realization: Realization,
    /// Active degree encoding.
    pub encoding: Encoding,
    /// Maximum number of models to enumerate; 0 means unbounded.
    pub max_models: usize,
}

impl SolveConfig {
    /// Builds a configuration with an unbounded model count.
    pub fn new(realization: Realization, encoding: Encoding) -> Self {
        SolveConfig {
            realization,
            encoding,
            max_models: 0,
        }
    }

    /// The model limit as an `Option`.
    pub fn limit(&self) -> Option<usize> {
        (self.max_models > 0).then_some(self.max_models)
    }

    /// All four realization/encoding pairs, with unbounded enumeration.
    pub fn all() -> [SolveConfig; 4] {
        [
            SolveConfig::new(Realization::Native, Encoding::Plain),
            SolveConfig::new(Realization::Native, Encoding::Ordered),
            SolveConfig::new(Realization::WeightConstraint, Encoding::Plain),
            SolveConfig::new(Realization::WeightConstraint, Encoding::Ordered),
        ]
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_native_plain_unbounded() {
        let config = SolveConfig::default();
        assert_eq!(config.realization, Realization::Native);
        assert_eq!(config.encoding, Encoding::Plain);
        assert_eq!(config.limit(), None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SolveConfig::from_toml_str("encoding = \"ordered\"").unwrap();
        assert_eq!(config.realization, Realization::Native);
        assert_eq!(config.encoding, Encoding::Ordered);
        assert_eq!(config.max_models, 0);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(SolveConfig::from_toml_str("realization = \"quantum\"").is_err());
    }

    #[test]
    fn all_covers_the_four_pairs() {
        let configs = SolveConfig::all();
        assert_eq!(configs.len(), 4);
        let distinct: std::collections::HashSet<_> = configs.iter().collect();
        assert_eq!(distinct.len(), 4);
    }
}
