//! Error types for gradus-engine.

use thiserror::Error;

use crate::atom::Lit;

/// Errors raised by the engine itself.
///
/// Ordinary propagation conflicts are not errors - they trigger
/// backtracking. What surfaces here are protocol defects.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A final `check` rejected a model that incremental propagation
    /// accepted. Incremental state and the from-scratch recomputation
    /// disagree; this is a defect in a propagator, never a normal
    /// runtime condition.
    #[error("final check rejected a propagated model (explanation: {explanation:?})")]
    CheckRejected { explanation: Vec<Lit> },
}

/// Result type alias for gradus-engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
