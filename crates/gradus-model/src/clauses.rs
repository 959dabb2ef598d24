//! Weighted clause systems and the satisfied-clause parity construction.
//!
//! Text format: a `maxsat` header line, then one clause per line as
//! nonzero integer literals (negative = negated variable). Variables are
//! inferred from the largest absolute literal.
//!
//! With `m` clauses the construction quantizes over `m` degrees with the
//! half-integer table `[m/2, 3m/2, …, (2m−1)m/2]`:
//! - crisp variable nodes `x<i>` and a pinned crisp `bias`;
//! - one crisp clause node `c<j>` per clause, with literal weights `±m`
//!   and bias weight `m × #negative-literals`, so its weighted sum is
//!   `m² × (satisfied literals)` - degree 0 when the clause is violated
//!   and the maximal degree otherwise;
//! - a counter node `sat` with a unit-weight edge per clause node, whose
//!   degree equals the number of satisfied clauses.
//!
//! The parity query asks for the parity of the largest achievable
//! counter degree.

use gradus_core::{BreakpointTable, DependencyGraph, GraphBuilder, Real};

use crate::error::{ModelError, Result};

/// A parsed weighted clause system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseSystem {
    variables: usize,
    clauses: Vec<Vec<i64>>,
}

impl ClauseSystem {
    /// Name of the satisfied-clause counter node.
    pub const COUNTER: &'static str = "sat";

    /// Parses the `maxsat` text format.
    pub fn parse(text: &str) -> Result<Self> {
        let mut variables = 0usize;
        let mut clauses = Vec::new();
        let mut seen_header = false;
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let number = index + 1;
            if !seen_header {
                if line != "maxsat" {
                    return Err(ModelError::parse(number, "expected a `maxsat` header"));
                }
                seen_header = true;
                continue;
            }
            let mut clause = Vec::new();
            for token in line.split_whitespace() {
                let literal: i64 = token
                    .parse()
                    .map_err(|_| ModelError::parse(number, format!("bad literal `{token}`")))?;
                if literal == 0 {
                    return Err(ModelError::parse(number, "literal 0 is not allowed"));
                }
                variables = variables.max(literal.unsigned_abs() as usize);
                clause.push(literal);
            }
            if clause.is_empty() {
                return Err(ModelError::parse(number, "empty clause"));
            }
            clauses.push(clause);
        }
        if !seen_header || clauses.is_empty() {
            return Err(ModelError::EmptyNetwork);
        }
        Ok(ClauseSystem { variables, clauses })
    }

    /// Number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables
    }

    /// Number of clauses (= the maximal degree of the construction).
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// The half-integer breakpoint table `[m(2k+1)/2]` for `k ∈ 0..m`.
    pub fn breakpoint_table(&self) -> BreakpointTable {
        let m = self.clauses.len() as i64;
        let breakpoints = (0..m)
            .map(|k| Real::from_scaled(m * (2 * k + 1) * 500))
            .collect();
        BreakpointTable::new(breakpoints)
            .unwrap_or_else(|_| unreachable!("half-integer steps ascend"))
    }

    /// Compiles the parity construction against `table`
    /// (as produced by [`ClauseSystem::breakpoint_table`]).
    pub fn compile(&self, table: &BreakpointTable) -> Result<DependencyGraph> {
        let m = self.clauses.len() as i64;
        let mut builder = GraphBuilder::new();
        let variables: Vec<_> = (1..=self.variables)
            .map(|index| builder.add_node(format!("x{index}"), true))
            .collect::<gradus_core::Result<_>>()?;
        let bias = builder.add_node("bias", true)?;
        builder.add_exactly_one(vec![bias]);
        let counter = builder.add_node(Self::COUNTER, false)?;

        for (index, clause) in self.clauses.iter().enumerate() {
            let node = builder.add_node(format!("c{}", index + 1), true)?;
            let negative = clause.iter().filter(|l| **l < 0).count() as i64;
            for literal in clause {
                let variable = variables[(literal.unsigned_abs() - 1) as usize];
                let weight = if *literal > 0 { m } else { -m };
                builder.add_edge(node, variable, Real::from_int(weight))?;
            }
            if negative > 0 {
                builder.add_edge(node, bias, Real::from_int(m * negative))?;
            }
            builder.add_edge(counter, node, Real::from_int(1))?;
        }
        Ok(builder.build(table)?)
    }
}
