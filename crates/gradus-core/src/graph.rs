//! Weighted dependency graphs.
//!
//! A graph is a set of named nodes, directed weighted edges
//! `(target, source, weight)`, per-node crispness flags, and exactly-one
//! groups ("exactly one member sits at the maximal degree"). Graphs are
//! built once by a parser or by hand, validated, and then immutable and
//! safely shared by reference for the whole run.

use std::collections::HashMap;

use crate::breakpoints::BreakpointTable;
use crate::error::{CoreError, Result};
use crate::real::Real;

/// Identifier of a node in a [`DependencyGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The node's index in the graph's node table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An incoming edge of some target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// The node whose degree is weighed in.
    pub source: NodeId,
    /// The edge weight.
    pub weight: Real,
}

#[derive(Debug, Clone)]
struct NodeInfo {
    name: String,
    crisp: bool,
}

/// Mutable builder for [`DependencyGraph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<NodeInfo>,
    index: HashMap<String, NodeId>,
    incoming: Vec<Vec<Edge>>,
    exactly_one: Vec<Vec<NodeId>>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a node; names must be unique.
    pub fn add_node(&mut self, name: impl Into<String>, crisp: bool) -> Result<NodeId> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(CoreError::DuplicateNode { name });
        }
        let id = NodeId(self.nodes.len() as u32);
        self.index.insert(name.clone(), id);
        self.nodes.push(NodeInfo { name, crisp });
        self.incoming.push(Vec::new());
        Ok(id)
    }

    /// Looks up a declared node by name.
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Adds a weighted edge into `target`.
    pub fn add_edge(&mut self, target: NodeId, source: NodeId, weight: Real) -> Result<()> {
        if target == source {
            return Err(CoreError::SelfReference {
                node: self.nodes[target.index()].name.clone(),
            });
        }
        self.incoming[target.index()].push(Edge { source, weight });
        Ok(())
    }

    /// Adds an exactly-one group over `members`.
    pub fn add_exactly_one(&mut self, members: Vec<NodeId>) {
        self.exactly_one.push(members);
    }

    /// Validates against `table` and freezes the graph.
    ///
    /// A crisp target whose achievable weighted sums can map to neither
    /// degree 0 nor the maximal degree is rejected here, before any search.
    pub fn build(self, table: &BreakpointTable) -> Result<DependencyGraph> {
        let max = table.max_level() as i64;
        for (index, info) in self.nodes.iter().enumerate() {
            if !info.crisp || self.incoming[index].is_empty() {
                continue;
            }
            let mut lo = Real::ZERO;
            let mut hi = Real::ZERO;
            for edge in &self.incoming[index] {
                let swing = edge.weight.scale_by(max);
                if swing.is_negative() {
                    lo += swing;
                } else {
                    hi += swing;
                }
            }
            if table.level_of(lo) != 0 && table.level_of(hi) != table.max_level() {
                return Err(CoreError::InconsistentCrispRequirement {
                    node: info.name.clone(),
                });
            }
        }
        Ok(DependencyGraph {
            nodes: self.nodes,
            incoming: self.incoming,
            exactly_one: self.exactly_one,
        })
    }
}

/// An immutable weighted dependency graph.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<NodeInfo>,
    incoming: Vec<Vec<Edge>>,
    exactly_one: Vec<Vec<NodeId>>,
}

impl DependencyGraph {
    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All node identifiers.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// The node's symbolic name.
    pub fn node_name(&self, node: NodeId) -> &str {
        &self.nodes[node.index()].name
    }

    /// Looks up a node by name.
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u32))
    }

    /// Whether the node is restricted to degrees `{0, N}`.
    pub fn is_crisp(&self, node: NodeId) -> bool {
        self.nodes[node.index()].crisp
    }

    /// The incoming edges of `target` (empty for pure inputs).
    pub fn incoming(&self, target: NodeId) -> &[Edge] {
        &self.incoming[target.index()]
    }

    /// Nodes with at least one incoming edge, i.e. the quantization targets.
    pub fn targets(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node_ids().filter(|n| !self.incoming(*n).is_empty())
    }

    /// The exactly-one groups.
    pub fn exactly_one_groups(&self) -> &[Vec<NodeId>] {
        &self.exactly_one
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BreakpointTable {
        BreakpointTable::new(vec![
            Real::from_int(-2),
            Real::from_int(0),
            Real::from_int(2),
        ])
        .unwrap()
    }

    #[test]
    fn builds_a_small_graph() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a", true).unwrap();
        let b = builder.add_node("b", false).unwrap();
        builder.add_edge(b, a, Real::from_int(1)).unwrap();
        builder.add_exactly_one(vec![a]);
        let graph = builder.build(&table()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.is_crisp(a));
        assert_eq!(graph.incoming(b), &[Edge { source: a, weight: Real::from_int(1) }]);
        assert_eq!(graph.targets().collect::<Vec<_>>(), vec![b]);
        assert_eq!(graph.node("b"), Some(b));
    }

    #[test]
    fn rejects_duplicates_and_self_edges() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a", false).unwrap();
        assert!(matches!(
            builder.add_node("a", false),
            Err(CoreError::DuplicateNode { .. })
        ));
        assert!(matches!(
            builder.add_edge(a, a, Real::ZERO),
            Err(CoreError::SelfReference { .. })
        ));
    }

    #[test]
    fn rejects_unreachable_crisp_requirement() {
        // The only achievable sums of `c` live strictly between the first
        // and last breakpoint, so degrees 0 and N are both unreachable.
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a", false).unwrap();
        let c = builder.add_node("c", true).unwrap();
        builder
            .add_edge(c, a, Real::from_scaled(100))
            .unwrap();
        assert!(matches!(
            builder.build(&table()),
            Err(CoreError::InconsistentCrispRequirement { .. })
        ));
    }

    #[test]
    fn crisp_sources_are_fine() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a", true).unwrap();
        let c = builder.add_node("c", true).unwrap();
        builder.add_edge(c, a, Real::from_int(1)).unwrap();
        assert!(builder.build(&table()).is_ok());
    }
}
