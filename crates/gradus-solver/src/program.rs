//! Program assembly.
//!
//! Wires an immutable dependency graph and breakpoint table into an
//! engine program under the configured realization and encoding:
//! degree atoms with exactly-one selection per node, crisp restrictions,
//! the ordered chain where requested, the graph's exactly-one groups
//! (over the maximal-degree atoms), and finally the quantization
//! constraints themselves.

use std::sync::Arc;

use gradus_core::{BreakpointTable, DependencyGraph};
use gradus_engine::{Atom, Engine, Lit};

use crate::config::{Encoding, Realization, SolveConfig};
use crate::layout::AtomLayout;
use crate::native::StaircasePropagator;
use crate::{ordered, wc};

/// Builds the full program; returns the atom table for read-back.
pub(crate) fn build(
    engine: &mut Engine,
    graph: &DependencyGraph,
    table: &Arc<BreakpointTable>,
    config: &SolveConfig,
) -> AtomLayout {
    let layout = AtomLayout::build(engine, graph, table, config.encoding);
    let max = table.max_level();

    for node in graph.node_ids() {
        let row: Vec<Atom> = (0..=max).map(|v| layout.val(node, v)).collect();
        engine.add_exactly_one(&row);
        if graph.is_crisp(node) {
            for v in 1..max {
                engine.add_clause(&[Lit::negative(layout.val(node, v))]);
            }
        }
        if config.encoding == Encoding::Ordered {
            ordered::add_level_chain(engine, &layout, node);
        }
    }

    for group in graph.exactly_one_groups() {
        let atoms: Vec<Atom> = group.iter().map(|member| layout.val(*member, max)).collect();
        engine.add_exactly_one(&atoms);
    }

    match config.realization {
        Realization::Native => {
            for target in graph.targets() {
                engine.add_propagator(Box::new(StaircasePropagator::new(
                    graph,
                    Arc::clone(table),
                    &layout,
                    target,
                )));
            }
        }
        Realization::WeightConstraint => {
            wc::compile(engine, graph, table, &layout, config.encoding);
        }
    }

    layout
}
