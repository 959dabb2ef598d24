//! Topologies end to end: solving and graded queries.

use std::sync::Arc;

use gradus_model::Network;
use gradus_solver::{equivalence, Controller, GradedQuery, SolveConfig};

#[test]
fn exclusive_inputs_solve_to_two_models() {
    let network = Network::detect("10 20 -10\n=1 1 2\n").unwrap();
    let compiled = network.compile(None).unwrap();
    let in1 = compiled.graph.node("l1_1").unwrap();
    let in2 = compiled.graph.node("l1_2").unwrap();
    let max = compiled.table.max_level();

    for config in SolveConfig::all() {
        let controller =
            Controller::from_parts(compiled.graph.clone(), compiled.table.clone(), config);
        let solutions = controller.find_solutions().unwrap();
        assert_eq!(solutions.len(), 2, "under {config:?}");
        for solution in &solutions {
            assert_eq!(solution.level(in1) + solution.level(in2), max);
        }
    }
}

#[test]
fn compiled_topology_realizations_agree() {
    let network = Network::detect("10 20 -10\n=1 1 2\n").unwrap();
    let compiled = network.compile(None).unwrap();
    let report = equivalence::solution_sets(
        &Arc::new(compiled.graph),
        &Arc::new(compiled.table),
    )
    .unwrap();
    assert!(report.agree(), "sets: {:#?}", report.sets);
}

#[test]
fn graded_query_tracks_the_threshold() {
    // Free crisp inputs: whenever l1_1 is at its maximum, the output
    // lands on degree 3 of 5, so the implication holds at 0.6 exactly.
    let network = Network::detect("10 20 -10\n").unwrap();
    let compiled = network.compile(None).unwrap();
    let controller = Controller::from_parts(
        compiled.graph.clone(),
        compiled.table.clone(),
        SolveConfig::default(),
    );

    let affirmed = controller
        .answer_query(&GradedQuery::parse("l1_1#l2_1#0.5").unwrap())
        .unwrap();
    assert_eq!(affirmed.verdict, Some(true));
    assert_eq!(affirmed.left_value, Some(1.0));
    assert_eq!(affirmed.right_value, Some(0.6));

    let refuted = controller
        .answer_query(&GradedQuery::parse("l1_1#l2_1#0.8").unwrap())
        .unwrap();
    assert_eq!(refuted.verdict, Some(false));
    assert_eq!(refuted.right_value, Some(0.6));
    assert!(refuted.witness.is_some());
}

#[test]
fn nested_concepts_evaluate_under_goedel_semantics() {
    let network = Network::detect("10 20 -10\n").unwrap();
    let compiled = network.compile(None).unwrap();
    let controller = Controller::from_parts(
        compiled.graph.clone(),
        compiled.table.clone(),
        SolveConfig::default(),
    );

    // and(l1_1, neg(l1_2)) peaks at degree 5 when l1_1=5 and l1_2=0.
    let result = controller
        .answer_query(&GradedQuery::parse("and(l1_1,neg(l1_2))#l2_1#0.6").unwrap())
        .unwrap();
    assert_eq!(result.verdict, Some(true));
    assert_eq!(result.left_value, Some(1.0));
}

#[test]
fn unknown_concept_names_error() {
    let network = Network::detect("10 20 -10\n").unwrap();
    let compiled = network.compile(None).unwrap();
    let controller = Controller::from_parts(
        compiled.graph,
        compiled.table,
        SolveConfig::default(),
    );
    let query = GradedQuery::parse("ghost#l2_1#0.5").unwrap();
    assert!(controller.answer_query(&query).is_err());
}
