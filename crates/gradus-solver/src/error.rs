//! Error types for gradus-solver.

use thiserror::Error;

/// Errors surfaced by program building, solving and queries.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Construction-time data error.
    #[error(transparent)]
    Core(#[from] gradus_core::CoreError),

    /// Engine protocol defect.
    #[error(transparent)]
    Engine(#[from] gradus_engine::EngineError),

    /// I/O error while loading settings.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML settings.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A query string that does not follow `left#right#threshold`.
    #[error("invalid query `{text}`: {reason}")]
    InvalidQuery { text: String, reason: String },
}

/// Result type alias for gradus-solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;
