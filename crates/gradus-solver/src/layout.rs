//! Atom layout: mapping nodes and degrees onto engine atoms.
//!
//! For each node `n` there is one `val(n, v)` atom per degree
//! `v ∈ 0..=N`. Under the ordered encoding there are additionally
//! `ge(n, k)` indicator atoms for `k ∈ 1..=N`, meaning "the degree of
//! `n` is at least `k`". The engine sees only opaque atoms; this table
//! is the single place that remembers what they stand for.

use gradus_core::{BreakpointTable, DependencyGraph, Level, NodeId};
use gradus_engine::{Atom, Engine, Model};

use crate::config::Encoding;
use crate::solution::Solution;

/// The atom table of one engine program.
#[derive(Debug, Clone)]
pub struct AtomLayout {
    max_level: Level,
    val: Vec<Vec<Atom>>,
    ge: Vec<Vec<Atom>>,
}

impl AtomLayout {
    /// Allocates atoms for every node of `graph`.
    pub(crate) fn build(
        engine: &mut Engine,
        graph: &DependencyGraph,
        table: &BreakpointTable,
        encoding: Encoding,
    ) -> Self {
        Self::build_with(|| engine.new_atom(), graph, table, encoding)
    }

    /// Same, over an arbitrary atom allocator (used by scripted tests).
    pub(crate) fn build_with(
        mut fresh: impl FnMut() -> Atom,
        graph: &DependencyGraph,
        table: &BreakpointTable,
        encoding: Encoding,
    ) -> Self {
        let max_level = table.max_level();
        let val = graph
            .node_ids()
            .map(|_| (0..=max_level).map(|_| fresh()).collect())
            .collect();
        let ge = match encoding {
            Encoding::Plain => Vec::new(),
            Encoding::Ordered => graph
                .node_ids()
                .map(|_| (1..=max_level).map(|_| fresh()).collect())
                .collect(),
        };
        AtomLayout { max_level, val, ge }
    }

    /// The maximal degree `N`.
    pub fn max_level(&self) -> Level {
        self.max_level
    }

    /// Whether at-least indicators exist.
    pub fn has_ordered(&self) -> bool {
        !self.ge.is_empty()
    }

    /// The `val(node, level)` atom.
    pub fn val(&self, node: NodeId, level: Level) -> Atom {
        self.val[node.index()][level]
    }

    /// The `ge(node, k)` atom, `k ∈ 1..=N`.
    pub fn ge(&self, node: NodeId, k: Level) -> Atom {
        debug_assert!((1..=self.max_level).contains(&k));
        self.ge[node.index()][k - 1]
    }

    /// Reads the committed degree of every node out of a model.
    pub fn decode(&self, model: &Model) -> Solution {
        let levels = self
            .val
            .iter()
            .map(|row| {
                row.iter()
                    .position(|atom| model.atom_true(*atom))
                    .unwrap_or(0)
            })
            .collect();
        Solution::new(levels)
    }
}
