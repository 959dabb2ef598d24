//! Gradus Core - shared types for quantized truth-degree reasoning
//!
//! This crate provides the fundamental abstractions for gradus:
//! - Fixed-point reals for exact weight arithmetic
//! - Breakpoint tables and the staircase function
//! - Weighted dependency graphs with crispness flags
//! - Concept expressions under Gödel fuzzy semantics

pub mod breakpoints;
pub mod concept;
pub mod error;
pub mod graph;
pub mod real;

pub use breakpoints::{BreakpointTable, Level};
pub use concept::Concept;
pub use error::{CoreError, Result};
pub use graph::{DependencyGraph, Edge, GraphBuilder, NodeId};
pub use real::Real;
