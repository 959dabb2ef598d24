//! Gradus Model - network kinds behind one compilation interface
//!
//! Three mutually exclusive input shapes produce the same immutable
//! problem data (dependency graph + breakpoint table):
//! - Layered feed-forward topologies
//! - Weighted argumentation graphs
//! - Weighted clause systems (satisfied-clause parity construction)
//!
//! The closed set is an enum; every variant parses its own text format
//! and compiles itself, so downstream code never inspects the kind at
//! runtime.

pub mod argumentation;
pub mod clauses;
pub mod error;
pub mod topology;

pub use argumentation::ArgumentationGraph;
pub use clauses::ClauseSystem;
pub use error::{ModelError, Result};
pub use topology::NetworkTopology;

use gradus_core::{BreakpointTable, DependencyGraph};

/// A compiled network, ready for a solve controller.
#[derive(Debug, Clone)]
pub struct Compiled {
    /// The dependency graph.
    pub graph: DependencyGraph,
    /// The breakpoint table the graph was validated against.
    pub table: BreakpointTable,
    /// Name of the satisfied-clause counter node, for clause systems.
    pub parity_counter: Option<String>,
}

/// The closed set of network kinds.
#[derive(Debug, Clone)]
pub enum Network {
    /// Layered feed-forward topology.
    Topology(NetworkTopology),
    /// Weighted argumentation graph.
    Argumentation(ArgumentationGraph),
    /// Weighted clause system.
    Clauses(ClauseSystem),
}

impl Network {
    /// Parses network text, detecting the kind:
    /// a `maxsat` header introduces a clause system, a file of
    /// `attack/3` facts an argumentation graph, anything else a layered
    /// topology.
    pub fn detect(text: &str) -> Result<Network> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let Some(first) = lines.next() else {
            return Err(ModelError::EmptyNetwork);
        };
        if first == "maxsat" {
            return Ok(Network::Clauses(ClauseSystem::parse(text)?));
        }
        if std::iter::once(first)
            .chain(lines)
            .all(|line| line.starts_with("attack("))
        {
            return Ok(Network::Argumentation(ArgumentationGraph::parse(text)?));
        }
        Ok(Network::Topology(NetworkTopology::parse(text)?))
    }

    /// Compiles into problem data.
    ///
    /// Topologies and argumentation graphs quantize against `table`
    /// (the historical default when `None`); clause systems derive their
    /// own table from the clause count and reject an explicit one.
    pub fn compile(&self, table: Option<BreakpointTable>) -> Result<Compiled> {
        match self {
            Network::Topology(topology) => {
                let table = table.unwrap_or_default();
                let graph = topology.compile(&table)?;
                Ok(Compiled {
                    graph,
                    table,
                    parity_counter: None,
                })
            }
            Network::Argumentation(argumentation) => {
                let table = table.unwrap_or_default();
                let graph = argumentation.compile(&table)?;
                Ok(Compiled {
                    graph,
                    table,
                    parity_counter: None,
                })
            }
            Network::Clauses(clauses) => {
                if table.is_some() {
                    return Err(ModelError::ClauseSystemTable);
                }
                let table = clauses.breakpoint_table();
                let graph = clauses.compile(&table)?;
                Ok(Compiled {
                    graph,
                    table,
                    parity_counter: Some(ClauseSystem::COUNTER.to_string()),
                })
            }
        }
    }
}
