//! Graded subsumption queries.
//!
//! A query `left#right#threshold` asks whether, in every solution where
//! the left concept reaches its largest achievable degree, the Gödel
//! implication `impl(left, right)` evaluates to at least
//! `threshold × N`. Weighted clause systems instead ask the parity
//! question about their satisfied-clause counter.

use std::fmt;
use std::rc::Rc;

use gradus_core::{Concept, Level, Real};

use crate::error::{Result, SolverError};
use crate::solution::Solution;

/// A parsed `left#right#threshold` query.
#[derive(Debug, Clone)]
pub struct GradedQuery {
    /// Concept whose degree is maximized first.
    pub left: Rc<Concept>,
    /// Concept on the right of the implication.
    pub right: Rc<Concept>,
    /// Acceptance threshold in `(0, 1]`, scaled against the maximal degree.
    pub threshold: Real,
}

impl GradedQuery {
    /// Parses the concrete `left#right#threshold` syntax.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: &str| SolverError::InvalidQuery {
            text: text.to_string(),
            reason: reason.to_string(),
        };
        let mut parts = text.split('#');
        let (left, right, threshold) = match (parts.next(), parts.next(), parts.next(), parts.next())
        {
            (Some(left), Some(right), Some(threshold), None) => (left, right, threshold),
            _ => return Err(invalid("expected `left#right#threshold`")),
        };
        let left = Concept::parse(left)?;
        let right = Concept::parse(right)?;
        let threshold: Real = threshold
            .trim()
            .parse()
            .map_err(|_| invalid("threshold is not a real"))?;
        if threshold <= Real::ZERO || threshold > Real::from_int(1) {
            return Err(invalid("threshold must lie in (0, 1]"));
        }
        Ok(GradedQuery {
            left,
            right,
            threshold,
        })
    }
}

impl fmt::Display for GradedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}#{}", self.left, self.right, self.threshold)
    }
}

/// Outcome of a graded query.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// `Some(true)` / `Some(false)`, or `None` when no solution exists.
    pub verdict: Option<bool>,
    /// Degree of the left concept in the witness, rescaled into `[0, 1]`.
    pub left_value: Option<f64>,
    /// Degree of the implication in the witness, rescaled into `[0, 1]`.
    pub right_value: Option<f64>,
    /// The witness solution: a counterexample for a false verdict, an
    /// optimal solution for a true one.
    pub witness: Option<Solution>,
}

impl QueryResult {
    pub(crate) fn unknown() -> Self {
        QueryResult {
            verdict: None,
            left_value: None,
            right_value: None,
            witness: None,
        }
    }
}

/// Outcome of a parity query over a satisfied-clause counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParityResult {
    /// Largest achievable counter degree.
    pub count: Level,
    /// Whether that count is even.
    pub even: bool,
}
