//! `gradus` - truth-degree reasoning over weighted dependency graphs.
//!
//! Reads a network description (layered topology, argumentation graph,
//! or weighted clause system), quantizes it against a breakpoint table,
//! and either enumerates solutions or answers a query, under any of the
//! four realization/encoding configurations.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use gradus_core::BreakpointTable;
use gradus_model::{ModelError, Network};
use gradus_solver::{
    Controller, Encoding, GradedQuery, Realization, SolveConfig, SolverError,
};

mod render;

/// Truth-degree reasoning over weighted dependency graphs.
#[derive(Debug, Parser)]
#[command(name = "gradus", version, about)]
struct Cli {
    /// File containing the network description.
    #[arg(short = 't', long = "network-topology", global = true)]
    network: Option<PathBuf>,

    /// File containing the breakpoint table, one real per line
    /// (defaults to the historical five-degree table).
    #[arg(short = 'v', long = "val-phi", global = true)]
    val_phi: Option<PathBuf>,

    /// Maximum number of solutions to compute (0 for unbounded).
    #[arg(short = 's', long = "number-of-solutions", global = true, default_value_t = 0)]
    number_of_solutions: usize,

    /// Use weight constraints instead of the incremental propagator.
    #[arg(long, global = true)]
    wc: bool,

    /// Use the ordered encoding for truth degrees.
    #[arg(long, global = true)]
    ordered: bool,

    /// TOML settings file (overridden by the flags above).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print full error chains.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the program and print solutions.
    Solve,
    /// Answer the provided query.
    Query {
        /// The query as `left#right#threshold`, or `even` for a
        /// weighted clause system.
        query: Option<String>,
        /// File containing the query, as an alternative to the
        /// command line.
        #[arg(short = 'q', long = "query-filename")]
        query_filename: Option<PathBuf>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error(transparent)]
    Core(#[from] gradus_core::CoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Usage(String),
}

fn main() {
    let cli = Cli::parse();
    let debug = cli.debug;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let mut stdout = std::io::stdout();
    if let Err(error) = run(cli, &mut stdout) {
        if debug {
            eprintln!("{} {error:?}", "Error:".red().bold());
        } else {
            eprintln!("{} {error}", "Error:".red().bold());
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let network_path = cli
        .network
        .ok_or_else(|| CliError::Usage("missing option --network-topology".into()))?;
    let network = Network::detect(&std::fs::read_to_string(&network_path)?)?;

    let table = cli
        .val_phi
        .map(|path| -> Result<BreakpointTable, CliError> {
            Ok(BreakpointTable::parse_lines(&std::fs::read_to_string(path)?)?)
        })
        .transpose()?;

    let mut config = match &cli.config {
        Some(path) => SolveConfig::load(path)?,
        None => SolveConfig::default(),
    };
    if cli.wc {
        config.realization = Realization::WeightConstraint;
    }
    if cli.ordered {
        config.encoding = Encoding::Ordered;
    }
    if cli.number_of_solutions > 0 {
        config.max_models = cli.number_of_solutions;
    }

    let compiled = network.compile(table)?;
    tracing::debug!(
        ?config,
        nodes = compiled.graph.node_count(),
        degrees = compiled.table.max_level(),
        "network compiled"
    );
    let controller =
        Controller::from_parts(compiled.graph.clone(), compiled.table.clone(), config);

    match cli.command {
        Command::Solve => {
            let solutions = controller.find_solutions()?;
            if solutions.is_empty() {
                writeln!(out, "NO SOLUTIONS")?;
                return Ok(());
            }
            for (index, solution) in solutions.iter().enumerate() {
                render::solution_table(
                    out,
                    &format!("Solution {}", index + 1),
                    controller.graph(),
                    solution,
                    controller.max_level(),
                )?;
            }
        }
        Command::Query {
            query,
            query_filename,
        } => {
            let text = match (query, query_filename) {
                (Some(_), Some(_)) => {
                    return Err(CliError::Usage(
                        "--query-filename cannot be combined with an inline query".into(),
                    ))
                }
                (Some(text), None) => text,
                (None, Some(path)) => std::fs::read_to_string(path)?.trim().to_string(),
                (None, None) => return Err(CliError::Usage("no query was given".into())),
            };
            answer(&controller, &compiled, &text, out)?;
        }
    }
    Ok(())
}

fn answer(
    controller: &Controller,
    compiled: &gradus_model::Compiled,
    text: &str,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if let Some(counter) = &compiled.parity_counter {
        if text != "even" {
            return Err(CliError::Usage(
                "weighted clause systems answer the `even` query only".into(),
            ));
        }
        let counter = compiled
            .graph
            .node(counter)
            .ok_or_else(|| CliError::Usage("counter node missing".into()))?;
        return match controller.answer_parity(counter)? {
            None => Ok(writeln!(out, "UNKNOWN")?),
            Some(result) => {
                let verdict = if result.even { "TRUE" } else { "FALSE" };
                Ok(writeln!(
                    out,
                    "{verdict}: {} satisfied clauses at best",
                    result.count
                )?)
            }
        };
    }

    let query = GradedQuery::parse(text)?;
    let result = controller.answer_query(&query)?;
    let (Some(verdict), Some(left), Some(right)) =
        (result.verdict, result.left_value, result.right_value)
    else {
        writeln!(out, "UNKNOWN")?;
        return Ok(());
    };
    let relation = if verdict { ">=" } else { "<" };
    let title = format!(
        "{}: left concept {left}; right concept {right} {relation} {}",
        if verdict { "TRUE" } else { "FALSE" },
        query.threshold,
    );
    writeln!(out, "{title}")?;
    if let Some(witness) = &result.witness {
        render::solution_table(
            out,
            if verdict { "Optimum" } else { "Counterexample" },
            controller.graph(),
            witness,
            controller.max_level(),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use clap::Parser;

    use super::{run, Cli};

    fn network_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn invoke(args: &[&str]) -> Result<String, String> {
        let cli = Cli::parse_from(args);
        let mut out = Vec::new();
        run(cli, &mut out)
            .map(|()| String::from_utf8(out).unwrap())
            .map_err(|error| error.to_string())
    }

    #[test]
    fn solves_a_topology_file() {
        let file = network_file("10 20 -10\n=1 1 2\n");
        let output = invoke(&[
            "gradus",
            "-t",
            file.path().to_str().unwrap(),
            "solve",
        ])
        .unwrap();
        assert!(output.contains("Solution 2"));
        assert!(!output.contains("Solution 3"));
    }

    #[test]
    fn respects_the_solution_limit() {
        let file = network_file("10 20 -10\n");
        let output = invoke(&[
            "gradus",
            "-t",
            file.path().to_str().unwrap(),
            "-s",
            "1",
            "solve",
        ])
        .unwrap();
        assert!(output.contains("Solution 1"));
        assert!(!output.contains("Solution 2"));
    }

    #[test]
    fn answers_the_even_query() {
        let file = network_file("maxsat\n1 2\n-1\n-2\n");
        let output = invoke(&[
            "gradus",
            "-t",
            file.path().to_str().unwrap(),
            "query",
            "even",
        ])
        .unwrap();
        assert!(output.starts_with("TRUE"));
    }

    #[test]
    fn answers_a_graded_query_under_every_flag_combination() {
        let file = network_file("10 20 -10\n");
        for flags in [&[][..], &["--wc"][..], &["--ordered"][..], &["--wc", "--ordered"][..]] {
            let mut args = vec!["gradus", "-t", file.path().to_str().unwrap()];
            args.extend_from_slice(flags);
            args.extend_from_slice(&["query", "l1_1#l2_1#0.5"]);
            let output = invoke(&args).unwrap();
            assert!(output.starts_with("TRUE"), "flags {flags:?}: {output}");
        }
    }

    #[test]
    fn missing_network_is_a_usage_error() {
        let error = invoke(&["gradus", "solve"]).unwrap_err();
        assert!(error.contains("--network-topology"));
    }

    #[test]
    fn rejects_inline_query_combined_with_file() {
        let network = network_file("10 20 -10\n");
        let query = network_file("l1_1#l2_1#0.5");
        let error = invoke(&[
            "gradus",
            "-t",
            network.path().to_str().unwrap(),
            "query",
            "l1_1#l2_1#0.5",
            "-q",
            query.path().to_str().unwrap(),
        ])
        .unwrap_err();
        assert!(error.contains("cannot be combined"));
    }
}
