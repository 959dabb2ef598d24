//! Gradus Solver - staircase quantization over weighted dependency graphs
//!
//! This crate turns a dependency graph plus a breakpoint table into an
//! engine program and reads truth degrees back out of the models. The
//! quantization constraint has two realizations times two encodings:
//! - **Native**: a hand-written incremental propagator per target node,
//!   tracking running weighted-sum bounds with exact undo.
//! - **Weight constraints**: declarative linear comparisons handed to the
//!   engine's built-in sum reasoning.
//! - **Plain** or **ordered** level encoding; the ordered form represents
//!   a degree as a monotone chain of at-least indicators, which tightens
//!   the running sum one indicator at a time.
//!
//! All four configurations accept exactly the same solution sets; the
//! `equivalence` module exercises that contract.

#[cfg(test)]
mod native_tests;

pub mod config;
pub mod controller;
pub mod equivalence;
pub mod error;
pub mod layout;
pub mod native;
pub mod ordered;
pub mod program;
pub mod query;
pub mod solution;
pub mod wc;

pub use config::{Encoding, Realization, SolveConfig};
pub use controller::Controller;
pub use equivalence::EquivalenceReport;
pub use error::{Result, SolverError};
pub use layout::AtomLayout;
pub use native::StaircasePropagator;
pub use query::{GradedQuery, ParityResult, QueryResult};
pub use solution::Solution;
