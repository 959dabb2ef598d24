//! The weight-constraint compiler.
//!
//! The declarative, non-incremental realization: every target's staircase
//! constraint is restated as linear comparisons consumed by the engine's
//! built-in sum reasoning. Per target and degree `v` the plain form emits
//!
//! `val(t,v) ⟺ LB_v < Σ w_s·u·[val(s,u)] ≤ UB_v`
//!
//! with open-ended sentinels at the boundary degrees. The ordered form
//! instead ties every at-least indicator of the target to the same sum
//! restated per indicator, `ge(t,v) ⟺ Σ w_s·[ge(s,k)] > LB_v`, which is
//! numerically identical but updates one indicator at a time; degree 0
//! then follows from the channeling clauses. The price of this
//! realization is O(N) redundant constraints per target.

use gradus_core::{BreakpointTable, DependencyGraph};
use gradus_engine::{Engine, LinearConstraint, Lit};

use crate::config::Encoding;
use crate::layout::AtomLayout;

/// Compiles the staircase constraints of every target into linear
/// comparisons.
pub(crate) fn compile(
    engine: &mut Engine,
    graph: &DependencyGraph,
    table: &BreakpointTable,
    layout: &AtomLayout,
    encoding: Encoding,
) {
    let max = table.max_level();
    for target in graph.targets() {
        let edges = graph.incoming(target);
        match encoding {
            Encoding::Plain => {
                for v in table.levels() {
                    let (lower, upper) = table.bounds_of(v);
                    let terms = edges
                        .iter()
                        .flat_map(|edge| {
                            (1..=max).map(move |u| {
                                (
                                    edge.weight.scale_by(u as i64),
                                    Lit::positive(layout.val(edge.source, u)),
                                )
                            })
                        })
                        .collect();
                    engine.add_linear(LinearConstraint {
                        head: Lit::positive(layout.val(target, v)),
                        terms,
                        lower,
                        upper,
                    });
                }
            }
            Encoding::Ordered => {
                for v in 1..=max {
                    let (lower, _) = table.bounds_of(v);
                    let terms = edges
                        .iter()
                        .flat_map(|edge| {
                            (1..=max).map(move |k| {
                                (edge.weight, Lit::positive(layout.ge(edge.source, k)))
                            })
                        })
                        .collect();
                    engine.add_linear(LinearConstraint {
                        head: Lit::positive(layout.ge(target, v)),
                        terms,
                        lower,
                        upper: None,
                    });
                }
            }
        }
    }
}
