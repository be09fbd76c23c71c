//! `equishare` command line runner.

mod console;
mod records;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::error;

use equishare::{run_external, run_internal, ExternalRun, InternalRun};
use equishare_config::EquiShareConfig;
use equishare_solver::LocalSearchSolver;

use crate::records::{read_records, write_json, AssignedRow, PlacementRow};

#[derive(Parser)]
#[command(name = "equishare", version, about = "Equitable portfolio reassignment")]
struct Cli {
    /// Debug-level logs unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reassign clients among collection parties
    External(RunArgs),
    /// Rotate clients among internal advisors
    Internal(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// JSON array of input rows
    #[arg(short, long)]
    input: PathBuf,

    /// TOML or YAML configuration; defaults apply when absent
    #[arg(short, long, default_value = "equishare.toml")]
    config: PathBuf,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Solver budget per relaxation level, overriding the configuration.
    /// Each level gets the full budget, so a batch that falls through to
    /// the last level can take four times as long.
    #[arg(long, value_name = "SECONDS")]
    time_limit: Option<u64>,
}

fn load_config(path: &Path) -> anyhow::Result<EquiShareConfig> {
    let config = EquiShareConfig::load_or_default(path)
        .with_context(|| format!("loading {}", path.display()))?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run_config(args: &RunArgs) -> anyhow::Result<EquiShareConfig> {
    let config = load_config(&args.config)?;
    Ok(match args.time_limit {
        Some(0) => anyhow::bail!("--time-limit must be at least 1 second"),
        Some(seconds) => config.with_time_limit(Duration::from_secs(seconds)),
        None => config,
    })
}

fn external(args: &RunArgs) -> anyhow::Result<()> {
    let records = read_records(&args.input)?;
    let config = run_config(args)?;
    let solver = LocalSearchSolver::new()
        .with_late_acceptance_size(config.solver.late_acceptance_size)
        .with_accepted_count_limit(config.solver.accepted_count_limit);

    let run = run_external(records, &config, solver)?;
    print_external_summary(&run);

    let rows: Vec<AssignedRow> = run.rows.into_iter().map(AssignedRow::from).collect();
    write_json(&rows, args.output.as_deref())
}

fn internal(args: &RunArgs) -> anyhow::Result<()> {
    let records = read_records(&args.input)?;
    let config = load_config(&args.config)?;

    let run = run_internal(records, &config.advisors);
    print_internal_summary(&run);

    let rows: Vec<PlacementRow> = run.placements.into_iter().map(PlacementRow::from).collect();
    write_json(&rows, args.output.as_deref())
}

fn print_external_summary(run: &ExternalRun) {
    let mut lines = vec![
        ("Rows:", run.rows.len().to_string()),
        ("Locked:", run.locked.to_string()),
        ("Orphans patched:", run.orphans.to_string()),
    ];
    for batch in &run.batches {
        let name = batch.cohort.as_deref().unwrap_or("all");
        lines.push(("Batch:", format!("{} [{}]", name, batch.method)));
    }
    let title = if run.is_degraded() {
        "ASSIGNED (DEGRADED)"
    } else {
        "ASSIGNED"
    };
    console::print_summary(title, !run.is_degraded(), &lines);
}

fn print_internal_summary(run: &InternalRun) {
    let lines = vec![
        ("Placed:", run.placements.len().to_string()),
        ("Leftover:", run.leftover().to_string()),
        ("Pools:", run.tiers.len().to_string()),
    ];
    console::print_summary("ROTATION COMPLETE", run.leftover() == 0, &lines);
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    console::init(cli.verbose);

    let result = match &cli.command {
        Command::External(args) => external(args),
        Command::Internal(args) => internal(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(event = "run_failed", error = %format!("{e:#}"));
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
