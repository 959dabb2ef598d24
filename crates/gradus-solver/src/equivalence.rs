//! The equivalence contract harness.
//!
//! For a fixed graph, breakpoint table and crispness flags, every
//! realization/encoding pair must accept exactly the same solution set.
//! A divergence is a defect in one of the realizations, never a runtime
//! condition - this module exists so the test suite can catch it.
//!
//! The four configurations run concurrently; each worker builds its own
//! engine and propagator instances, sharing only the immutable graph and
//! table.

use std::sync::Arc;

use rayon::prelude::*;

use gradus_core::{BreakpointTable, DependencyGraph};

use crate::config::SolveConfig;
use crate::controller::Controller;
use crate::error::Result;
use crate::solution::Solution;

/// Solution sets of all four configurations over one problem.
#[derive(Debug)]
pub struct EquivalenceReport {
    /// Canonically ordered solutions per configuration.
    pub sets: Vec<(SolveConfig, Vec<Solution>)>,
}

impl EquivalenceReport {
    /// Whether all configurations produced the same solution set.
    pub fn agree(&self) -> bool {
        self.sets
            .windows(2)
            .all(|pair| pair[0].1 == pair[1].1)
    }

    /// The agreed solution set, if the configurations agree.
    pub fn consensus(&self) -> Option<&[Solution]> {
        self.agree().then(|| self.sets[0].1.as_slice())
    }
}

/// Runs every configuration and collects the solution sets.
pub fn solution_sets(
    graph: &Arc<DependencyGraph>,
    table: &Arc<BreakpointTable>,
) -> Result<EquivalenceReport> {
    let sets = SolveConfig::all()
        .into_par_iter()
        .map(|config| {
            let controller = Controller::new(Arc::clone(graph), Arc::clone(table), config);
            controller
                .find_solutions()
                .map(|solutions| (config, solutions))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(EquivalenceReport { sets })
}
