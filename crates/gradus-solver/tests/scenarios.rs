//! Fixed end-to-end scenarios, checked across all four configurations.

use std::sync::Arc;

use gradus_core::{BreakpointTable, DependencyGraph, GraphBuilder, NodeId, Real};
use gradus_solver::{equivalence, Controller, SolveConfig};

/// Two mutually exclusive crisp inputs feeding one target through
/// weights (bias 10, w1 20, w2 -10) under the default table.
fn exclusive_pair() -> (Arc<DependencyGraph>, Arc<BreakpointTable>, [NodeId; 4]) {
    let table = BreakpointTable::default();
    let mut builder = GraphBuilder::new();
    let bias = builder.add_node("bias", true).unwrap();
    let in1 = builder.add_node("in1", true).unwrap();
    let in2 = builder.add_node("in2", true).unwrap();
    let out = builder.add_node("out", false).unwrap();
    builder.add_edge(out, bias, Real::from_int(10)).unwrap();
    builder.add_edge(out, in1, Real::from_int(20)).unwrap();
    builder.add_edge(out, in2, Real::from_int(-10)).unwrap();
    // The bias is pinned at the maximal degree; exactly one input is.
    builder.add_exactly_one(vec![bias]);
    builder.add_exactly_one(vec![in1, in2]);
    let graph = builder.build(&table).unwrap();
    (Arc::new(graph), Arc::new(table), [bias, in1, in2, out])
}

#[test]
fn exclusive_pair_has_two_solutions_summing_to_max() {
    let (graph, table, [_, in1, in2, _]) = exclusive_pair();
    let max = table.max_level();
    for config in SolveConfig::all() {
        let controller = Controller::new(Arc::clone(&graph), Arc::clone(&table), config);
        let solutions = controller.find_solutions().unwrap();
        assert_eq!(solutions.len(), 2, "under {config:?}");
        for solution in &solutions {
            assert_eq!(solution.level(in1) + solution.level(in2), max);
        }
    }
}

#[test]
fn exclusive_pair_realizations_agree() {
    let (graph, table, _) = exclusive_pair();
    let report = equivalence::solution_sets(&graph, &table).unwrap();
    assert!(report.agree(), "sets: {:#?}", report.sets);
}

#[test]
fn zero_swing_target_is_deterministic() {
    // A weight-0 edge keeps the sum pinned at 0; the target must land on
    // degree level_of(0) in every solution of every configuration.
    let table = BreakpointTable::new(vec![
        Real::from_int(-1),
        Real::from_int(0),
        Real::from_int(1),
    ])
    .unwrap();
    let mut builder = GraphBuilder::new();
    let a = builder.add_node("a", false).unwrap();
    let t = builder.add_node("t", false).unwrap();
    builder.add_edge(t, a, Real::ZERO).unwrap();
    let graph = Arc::new(builder.build(&table).unwrap());
    let expected = table.level_of(Real::ZERO);
    let table = Arc::new(table);

    for config in SolveConfig::all() {
        let controller = Controller::new(Arc::clone(&graph), Arc::clone(&table), config);
        let solutions = controller.find_solutions().unwrap();
        // One solution per degree of the free input.
        assert_eq!(solutions.len(), 4, "under {config:?}");
        for solution in &solutions {
            assert_eq!(solution.level(t), expected, "under {config:?}");
        }
    }
}

#[test]
fn model_limit_truncates_enumeration() {
    let (graph, table, _) = exclusive_pair();
    let mut config = SolveConfig::default();
    config.max_models = 1;
    let controller = Controller::new(graph, table, config);
    assert_eq!(controller.find_solutions().unwrap().len(), 1);
}

#[test]
fn negative_feedback_cycle_agrees() {
    // Cyclic graphs are legal; the constraint is over total assignments.
    let table = BreakpointTable::new(vec![Real::from_int(-1), Real::from_int(1)]).unwrap();
    let mut builder = GraphBuilder::new();
    let a = builder.add_node("a", false).unwrap();
    let b = builder.add_node("b", false).unwrap();
    builder.add_edge(a, b, Real::from_int(-1)).unwrap();
    builder.add_edge(b, a, Real::from_int(-1)).unwrap();
    let graph = Arc::new(builder.build(&table).unwrap());
    let table = Arc::new(table);
    let report = equivalence::solution_sets(&graph, &table).unwrap();
    assert!(report.agree(), "sets: {:#?}", report.sets);
}
