//! Error types for gradus-model.

use thiserror::Error;

/// Errors raised while parsing or compiling a network.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Construction-time data error from the core types.
    #[error(transparent)]
    Core(#[from] gradus_core::CoreError),

    /// Malformed network text.
    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// A network file without any content.
    #[error("network description is empty")]
    EmptyNetwork,

    /// A structurally invalid topology (wrong weight arity, misplaced
    /// node, out-of-range group member).
    #[error("malformed topology: {0}")]
    Shape(String),

    /// Clause systems derive their breakpoint table from the clause
    /// count and do not accept an external one.
    #[error("weighted clause systems supply their own breakpoint table")]
    ClauseSystemTable,
}

impl ModelError {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        ModelError::Parse {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type alias for gradus-model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
