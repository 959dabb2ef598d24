//! Protocol-level tests of the staircase propagator.
//!
//! These drive a single propagator through the scripted engine bed, so
//! reversibility and exactness of undo are observable directly on the
//! running-sum bounds.

use std::sync::Arc;

use gradus_core::{BreakpointTable, GraphBuilder, NodeId, Real};
use gradus_engine::harness::TestBed;
use gradus_engine::Lit;

use crate::config::Encoding;
use crate::layout::AtomLayout;
use crate::native::StaircasePropagator;

fn table() -> Arc<BreakpointTable> {
    Arc::new(
        BreakpointTable::new(vec![
            Real::from_int(-2),
            Real::from_int(0),
            Real::from_int(2),
        ])
        .unwrap(),
    )
}

/// Two inputs `a` (weight 1) and `b` (weight -1) feeding one target `t`.
fn fixture(encoding: Encoding) -> (TestBed, AtomLayout, StaircasePropagator, [NodeId; 3]) {
    let table = table();
    let mut builder = GraphBuilder::new();
    let a = builder.add_node("a", false).unwrap();
    let b = builder.add_node("b", false).unwrap();
    let t = builder.add_node("t", false).unwrap();
    builder.add_edge(t, a, Real::from_int(1)).unwrap();
    builder.add_edge(t, b, Real::from_int(-1)).unwrap();
    let graph = builder.build(&table).unwrap();

    let mut bed = TestBed::new();
    let layout = AtomLayout::build_with(|| bed.new_atom(), &graph, &table, encoding);
    let propagator = StaircasePropagator::new(&graph, Arc::clone(&table), &layout, t);
    (bed, layout, propagator, [a, b, t])
}

#[test]
fn propagate_undo_propagate_is_identical() {
    let (mut bed, layout, mut prop, [a, _, _]) = fixture(Encoding::Plain);
    bed.init(&mut prop).unwrap();
    let initial = prop.bounds();
    assert_eq!(initial, (Real::from_int(-3), Real::from_int(3)));

    let lit = Lit::positive(layout.val(a, 2));
    let first = bed.assume(&mut prop, lit).unwrap();
    let after_first = prop.bounds();
    assert_eq!(after_first, (Real::from_int(-1), Real::from_int(2)));

    bed.retract(&mut prop);
    assert_eq!(prop.bounds(), initial);
    assert_eq!(prop.committed(), None);

    let second = bed.assume(&mut prop, lit).unwrap();
    assert_eq!(prop.bounds(), after_first);
    assert_eq!(first, second);
}

#[test]
fn repeated_cycles_do_not_drift() {
    let (mut bed, layout, mut prop, [a, b, _]) = fixture(Encoding::Plain);
    bed.init(&mut prop).unwrap();
    let initial = prop.bounds();
    for _ in 0..100 {
        bed.assume(&mut prop, Lit::positive(layout.val(a, 1))).unwrap();
        bed.assume(&mut prop, Lit::positive(layout.val(b, 2))).unwrap();
        bed.retract(&mut prop);
        bed.retract(&mut prop);
    }
    assert_eq!(prop.bounds(), initial);
}

#[test]
fn forces_target_once_window_collapses() {
    let (mut bed, layout, mut prop, [a, b, t]) = fixture(Encoding::Plain);
    bed.init(&mut prop).unwrap();
    bed.assume(&mut prop, Lit::positive(layout.val(a, 2))).unwrap();
    // a=2, b=3 gives sum -1, landing strictly inside degree 1.
    let forced = bed
        .assume(&mut prop, Lit::positive(layout.val(b, 3)))
        .unwrap();
    assert!(forced.contains(&Lit::positive(layout.val(t, 1))));
    assert_eq!(prop.committed(), Some(1));
}

#[test]
fn conflicts_on_a_committed_mismatch() {
    let (mut bed, layout, mut prop, [a, _, t]) = fixture(Encoding::Plain);
    bed.init(&mut prop).unwrap();
    // Committing degree 0 is fine while the window is still 0..=3.
    bed.assume(&mut prop, Lit::positive(layout.val(t, 0))).unwrap();
    // a=3 narrows the achievable window to 1..=3.
    let conflict = bed
        .assume(&mut prop, Lit::positive(layout.val(a, 3)))
        .unwrap_err();
    assert!(conflict.explanation.contains(&Lit::positive(layout.val(a, 3))));
    assert!(conflict.explanation.contains(&Lit::positive(layout.val(t, 0))));

    // The failed assumption unwinds exactly.
    bed.retract(&mut prop);
    assert_eq!(prop.committed(), Some(0));
    bed.assume(&mut prop, Lit::positive(layout.val(a, 0))).unwrap();
}

#[test]
fn target_without_inputs_is_pinned_at_init() {
    let table = table();
    let mut builder = GraphBuilder::new();
    let t = builder.add_node("t", false).unwrap();
    let graph = builder.build(&table).unwrap();
    let mut bed = TestBed::new();
    let layout = AtomLayout::build_with(|| bed.new_atom(), &graph, &table, Encoding::Plain);
    let mut prop = StaircasePropagator::new(&graph, Arc::clone(&table), &layout, t);

    let pinned = bed.init(&mut prop).unwrap();
    // The empty sum is 0, which quantizes to degree 1 of this table.
    assert_eq!(pinned, vec![Lit::positive(layout.val(t, 1))]);
}

#[test]
fn ordered_indicators_tighten_one_at_a_time() {
    let (mut bed, layout, mut prop, [a, b, _]) = fixture(Encoding::Ordered);
    bed.init(&mut prop).unwrap();
    assert_eq!(prop.bounds(), (Real::from_int(-3), Real::from_int(3)));

    // A single at-least indicator of `a` raises the lower bound before
    // a's final degree is anywhere near fixed.
    bed.assume(&mut prop, Lit::positive(layout.ge(a, 1))).unwrap();
    assert_eq!(prop.bounds(), (Real::from_int(-2), Real::from_int(3)));

    // Denying an indicator of the negative-weight input raises it again.
    bed.assume(&mut prop, Lit::negative(layout.ge(b, 3))).unwrap();
    assert_eq!(prop.bounds(), (Real::from_int(-1), Real::from_int(3)));

    bed.retract(&mut prop);
    bed.retract(&mut prop);
    assert_eq!(prop.bounds(), (Real::from_int(-3), Real::from_int(3)));
}

#[test]
fn ordered_window_collapse_forces_the_target() {
    let (mut bed, layout, mut prop, [a, b, t]) = fixture(Encoding::Ordered);
    bed.init(&mut prop).unwrap();
    // a fully at degree 3, b fully at degree 0: sum 3, degree 3.
    for k in 1..=3 {
        bed.assume(&mut prop, Lit::positive(layout.ge(a, k))).unwrap();
    }
    for k in 1..=2 {
        bed.assume(&mut prop, Lit::negative(layout.ge(b, k))).unwrap();
    }
    let forced = bed
        .assume(&mut prop, Lit::negative(layout.ge(b, 3)))
        .unwrap();
    assert!(forced.contains(&Lit::positive(layout.val(t, 3))));
}
