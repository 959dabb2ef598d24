//! The solve/query controller.
//!
//! A `Controller` is an explicit immutable value bundling the graph, the
//! breakpoint table and one solve configuration. Nothing about it is
//! shared process-wide; independent controllers over the same `Arc`-ed
//! graph are safe to run concurrently, each with its own engine and
//! propagator instances.

use std::rc::Rc;
use std::sync::Arc;

use gradus_core::{BreakpointTable, Concept, DependencyGraph, Level, NodeId, Real};
use gradus_engine::{Engine, Model};

use crate::config::SolveConfig;
use crate::error::Result;
use crate::layout::AtomLayout;
use crate::program;
use crate::query::{GradedQuery, ParityResult, QueryResult};
use crate::solution::Solution;

/// Solve and query entry point for one configuration.
pub struct Controller {
    graph: Arc<DependencyGraph>,
    table: Arc<BreakpointTable>,
    config: SolveConfig,
}

impl Controller {
    /// Creates a controller over shared problem data.
    pub fn new(graph: Arc<DependencyGraph>, table: Arc<BreakpointTable>, config: SolveConfig) -> Self {
        Controller {
            graph,
            table,
            config,
        }
    }

    /// Convenience constructor taking owned problem data.
    pub fn from_parts(graph: DependencyGraph, table: BreakpointTable, config: SolveConfig) -> Self {
        Self::new(Arc::new(graph), Arc::new(table), config)
    }

    /// The dependency graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// The breakpoint table.
    pub fn table(&self) -> &BreakpointTable {
        &self.table
    }

    /// The active configuration.
    pub fn config(&self) -> &SolveConfig {
        &self.config
    }

    /// The maximal truth degree `N`.
    pub fn max_level(&self) -> Level {
        self.table.max_level()
    }

    fn solve_models(&self, limit: Option<usize>) -> Result<(AtomLayout, Vec<Model>)> {
        let mut engine = Engine::new();
        let layout = program::build(&mut engine, &self.graph, &self.table, &self.config);
        tracing::debug!(
            config = ?self.config,
            atoms = engine.atom_count(),
            nodes = self.graph.node_count(),
            "program built"
        );
        let models = engine.solve(limit)?;
        Ok((layout, models))
    }

    /// Enumerates solutions under the configured model limit.
    pub fn find_solutions(&self) -> Result<Vec<Solution>> {
        let (layout, models) = self.solve_models(self.config.limit())?;
        let mut solutions: Vec<Solution> = models.iter().map(|m| layout.decode(m)).collect();
        solutions.sort();
        Ok(solutions)
    }

    /// Answers a graded `left#right#threshold` query.
    ///
    /// Among all solutions the left concept's largest achievable degree is
    /// determined first; the query is true when every such solution
    /// evaluates `impl(left, right)` to at least `threshold × N`, and
    /// false with a counterexample witness otherwise. Queries always
    /// explore the full model space, ignoring the configured limit.
    pub fn answer_query(&self, query: &GradedQuery) -> Result<QueryResult> {
        let (layout, models) = self.solve_models(None)?;
        let max = self.max_level();
        let implication = Rc::new(Concept::Impl(
            Rc::clone(&query.left),
            Rc::clone(&query.right),
        ));

        let mut evaluated: Vec<(Solution, Level, Level)> = Vec::with_capacity(models.len());
        for model in &models {
            let solution = layout.decode(model);
            let lookup = |name: &str| self.graph.node(name).map(|id| solution.level(id));
            let left = query.left.evaluate(max, &lookup)?;
            let value = implication.evaluate(max, &lookup)?;
            evaluated.push((solution, left, value));
        }

        let Some(best) = evaluated.iter().map(|(_, left, _)| *left).max() else {
            return Ok(QueryResult::unknown());
        };
        // value / N >= threshold, compared in exact fixed-point units.
        let reaches = |value: Level| {
            Real::from_int(value as i64) >= Real::from_scaled(query.threshold.scaled() * max as i64)
        };
        let counterexample = evaluated
            .iter()
            .filter(|(_, left, _)| *left == best)
            .find(|(_, _, value)| !reaches(*value));
        let chosen = counterexample.or_else(|| evaluated.iter().find(|(_, left, _)| *left == best));
        let Some((solution, left, value)) = chosen else {
            return Ok(QueryResult::unknown());
        };
        Ok(QueryResult {
            verdict: Some(counterexample.is_none()),
            left_value: Some(*left as f64 / max as f64),
            right_value: Some(*value as f64 / max as f64),
            witness: Some(solution.clone()),
        })
    }

    /// Answers the parity question for a satisfied-clause counter node:
    /// the parity of the largest achievable counter degree.
    pub fn answer_parity(&self, counter: NodeId) -> Result<Option<ParityResult>> {
        let (layout, models) = self.solve_models(None)?;
        let best = models
            .iter()
            .map(|model| layout.decode(model).level(counter))
            .max();
        Ok(best.map(|count| ParityResult {
            count,
            even: count % 2 == 0,
        }))
    }
}
