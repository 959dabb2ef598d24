//! Solutions: one committed truth degree per node.

use gradus_core::{DependencyGraph, Level, NodeId};

/// A total assignment of truth degrees, read back from a model.
///
/// Degrees are integers `0..=N`; callers rescale to `level / N` where a
/// fractional reading is wanted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Solution {
    levels: Vec<Level>,
}

impl Solution {
    pub(crate) fn new(levels: Vec<Level>) -> Self {
        Solution { levels }
    }

    /// The node's committed degree.
    pub fn level(&self, node: NodeId) -> Level {
        self.levels[node.index()]
    }

    /// The node's degree rescaled into `[0, 1]`.
    pub fn fraction(&self, node: NodeId, max: Level) -> f64 {
        self.level(node) as f64 / max as f64
    }

    /// Renders as `name=degree` pairs in node order.
    pub fn display(&self, graph: &DependencyGraph) -> String {
        graph
            .node_ids()
            .map(|node| format!("{}={}", graph.node_name(node), self.level(node)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
