//! Error types for gradus-core.

use thiserror::Error;

/// Errors raised while constructing the immutable problem data.
///
/// Everything here is fatal at construction time: a malformed breakpoint
/// table or an unsatisfiable crispness requirement is rejected before any
/// search begins.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The breakpoint vector is not strictly ascending.
    #[error("breakpoints must be strictly ascending (offending index {index})")]
    MalformedBreakpoints { index: usize },

    /// A breakpoint table with no breakpoints has no levels to assign.
    #[error("breakpoint table is empty")]
    EmptyBreakpoints,

    /// A crisp node whose achievable weighted sums can reach neither
    /// truth degree 0 nor the maximal degree.
    #[error("crisp node `{node}` can reach neither degree 0 nor the maximal degree")]
    InconsistentCrispRequirement { node: String },

    /// An edge from a node to itself.
    #[error("node `{node}` cannot depend on itself")]
    SelfReference { node: String },

    /// A node name that was never declared.
    #[error("unknown node `{name}`")]
    UnknownNode { name: String },

    /// A node name declared twice.
    #[error("duplicate node `{name}`")]
    DuplicateNode { name: String },

    /// A string that does not parse as a fixed-point real.
    #[error("invalid real literal `{text}`")]
    InvalidReal { text: String },

    /// A string that does not parse as a concept expression.
    #[error("invalid concept expression `{text}`: {reason}")]
    InvalidConcept { text: String, reason: String },
}

/// Result type alias for gradus-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
