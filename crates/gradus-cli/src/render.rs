//! Plain-text result tables.

use std::io::Write;

use owo_colors::OwoColorize;

use gradus_core::{DependencyGraph, Level};
use gradus_solver::Solution;

/// Writes one solution as a small aligned table of `degree/N` values.
pub(crate) fn solution_table(
    out: &mut dyn Write,
    title: &str,
    graph: &DependencyGraph,
    solution: &Solution,
    max: Level,
) -> std::io::Result<()> {
    writeln!(out, "{}", title.bold())?;
    let width = graph
        .node_ids()
        .map(|node| graph.node_name(node).len())
        .max()
        .unwrap_or(4)
        .max(4);
    writeln!(out, "  {:<width$}  {}", "Node".dimmed(), "Value".dimmed())?;
    for node in graph.node_ids() {
        writeln!(
            out,
            "  {:<width$}  {}/{}",
            graph.node_name(node),
            solution.level(node),
            max
        )?;
    }
    Ok(())
}
