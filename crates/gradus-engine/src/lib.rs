//! Gradus Engine - backtracking search with incremental propagators
//!
//! This crate provides the search engine that drives the quantization
//! constraints:
//! - Opaque atoms and literals
//! - The `Propagator` callback protocol (init / propagate / undo / check)
//! - Engine-native builtins: clauses, exactly-one groups, linear-sum
//!   constraints
//! - Exhaustive, deterministic model enumeration with a model limit
//!
//! The engine owns the assignment. Propagators only observe newly-true
//! watched literals, force consequences through the propagation context,
//! and report conflicts with a minimal explanation; they never mutate the
//! assignment directly.

pub mod atom;
pub mod builtins;
pub mod engine;
pub mod error;
pub mod harness;
pub mod propagator;

pub use atom::{Atom, Lit};
pub use builtins::linear::LinearConstraint;
pub use engine::{Engine, Model};
pub use error::{EngineError, Result};
pub use propagator::{Conflict, InitContext, ModelView, PropagateContext, Propagator};
