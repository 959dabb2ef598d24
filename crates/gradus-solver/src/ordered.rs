//! The ordered (unary) degree encoding.
//!
//! A degree `v` is restated as a monotone chain of at-least indicators:
//! `ge(n,k)` for `k ∈ 1..=N`, with `ge(n,k) ⇒ ge(n,k-1)` and
//! `val(n,v) ⟺ ge(n,v) ∧ ¬ge(n,v+1)`. Indicators become true one at a
//! time as the engine commits to increasing degrees, so weighted-sum
//! reasoning can tighten per indicator instead of waiting for the final
//! degree.
//!
//! The chain and channeling invariants are ordinary clause constraints,
//! maintained by the engine independently of any staircase propagator.

use gradus_core::NodeId;
use gradus_engine::{Engine, Lit};

use crate::layout::AtomLayout;

/// Emits the chain and channeling clauses for one node.
pub(crate) fn add_level_chain(engine: &mut Engine, layout: &AtomLayout, node: NodeId) {
    let max = layout.max_level();
    for k in 2..=max {
        engine.add_clause(&[
            Lit::negative(layout.ge(node, k)),
            Lit::positive(layout.ge(node, k - 1)),
        ]);
    }
    for v in 0..=max {
        let val = Lit::positive(layout.val(node, v));
        if v >= 1 {
            engine.add_clause(&[val.negated(), Lit::positive(layout.ge(node, v))]);
        }
        if v < max {
            engine.add_clause(&[val.negated(), Lit::negative(layout.ge(node, v + 1))]);
        }
        let mut closing = vec![val];
        if v >= 1 {
            closing.push(Lit::negative(layout.ge(node, v)));
        }
        if v < max {
            closing.push(Lit::positive(layout.ge(node, v + 1)));
        }
        engine.add_clause(&closing);
    }
}
