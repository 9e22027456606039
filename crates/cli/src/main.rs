use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use corridor_graph::{
    AdjacencyGraph, CorridorPlanner, CostMatrixSnapshot, PlanOutcome, Zone,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

mod dataset;
mod report;
mod settings;

use dataset::Dataset;
use report::{render_plan_report, PathsReport, PlanReport};
use settings::PlannerArgs;

/// Exit code for a plan whose clusters cannot all be connected
const EXIT_DISCONNECTED: i32 = 2;

#[derive(Parser)]
#[command(name = "dark-corridors")]
#[command(about = "Plan dark corridors between habitat clusters", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole pipeline and report corridors and lighting decisions
    Plan(PlanArgs),

    /// Build the zone adjacency graph and save it as a cost matrix snapshot
    #[command(name = "build-matrix")]
    BuildMatrix(BuildMatrixArgs),

    /// Compute least-cost paths between every pair of clusters
    Paths(PathsArgs),
}

#[derive(Args)]
struct PlanArgs {
    /// Zone and fixture dataset (JSON)
    #[arg(long)]
    dataset: PathBuf,

    /// Reuse a saved cost matrix instead of rebuilding adjacency
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[command(flatten)]
    planner: PlannerArgs,

    /// Also write the JSON report to this file
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write a Markdown summary to this file
    #[arg(long)]
    out_md: Option<PathBuf>,
}

#[derive(Args)]
struct BuildMatrixArgs {
    /// Zone dataset (JSON)
    #[arg(long)]
    dataset: PathBuf,

    /// Snapshot destination
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    planner: PlannerArgs,
}

#[derive(Args)]
struct PathsArgs {
    /// Zone dataset (JSON)
    #[arg(long)]
    dataset: PathBuf,

    /// Reuse a saved cost matrix instead of rebuilding adjacency
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[command(flatten)]
    planner: PlannerArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Plan(args) => run_plan(args)?,
        Commands::BuildMatrix(args) => run_build_matrix(args)?,
        Commands::Paths(args) => run_paths(args)?,
    }

    Ok(())
}

fn run_plan(args: PlanArgs) -> Result<()> {
    let config = args.planner.resolve()?;
    let (zones, fixtures) = Dataset::load(&args.dataset)?.into_parts();
    let planner = CorridorPlanner::with_config(config.clone())?;
    let graph = load_snapshot(args.snapshot.as_deref(), &zones)?;

    let outcome = planner
        .plan_partial(&zones, &fixtures, graph)
        .context("Corridor planning failed")?;
    let report = match &outcome {
        PlanOutcome::Complete(plan) => {
            log::info!(
                "Selected {} corridors (total score {:.3}); {} of {} lights switched off",
                plan.corridors.len(),
                plan.corridors.total_score(),
                plan.lighting.excluded.len(),
                fixtures.len()
            );
            PlanReport::complete(&config, plan)
        }
        PlanOutcome::Partial(partial) => {
            log::error!("{}", partial.failure);
            PlanReport::disconnected(&config, partial)
        }
    };

    if let Some(path) = &args.out {
        write_file(path, serde_json::to_string_pretty(&report)?)?;
    }
    if let Some(path) = &args.out_md {
        write_file(path, render_plan_report(&args.dataset, &report))?;
    }
    print_json(&report)?;

    if matches!(outcome, PlanOutcome::Partial(_)) {
        std::process::exit(EXIT_DISCONNECTED);
    }
    Ok(())
}

fn run_build_matrix(args: BuildMatrixArgs) -> Result<()> {
    let config = args.planner.resolve()?;
    let (zones, _) = Dataset::load(&args.dataset)?.into_parts();
    let planner = CorridorPlanner::with_config(config)?;

    let costs = planner.costs(&zones)?;
    let graph = planner.build_graph(&zones, &costs)?;
    let snapshot = CostMatrixSnapshot::from_graph(&graph);
    snapshot
        .save(&args.out)
        .with_context(|| format!("Failed to write snapshot {}", args.out.display()))?;

    #[derive(Serialize)]
    struct BuildMatrixOutput<'a> {
        snapshot: &'a Path,
        zones: usize,
        edges: usize,
    }
    print_json(&BuildMatrixOutput {
        snapshot: &args.out,
        zones: graph.node_count(),
        edges: graph.edge_count(),
    })
}

fn run_paths(args: PathsArgs) -> Result<()> {
    let config = args.planner.resolve()?;
    let (zones, _) = Dataset::load(&args.dataset)?.into_parts();
    let planner = CorridorPlanner::with_config(config)?;
    let graph = load_snapshot(args.snapshot.as_deref(), &zones)?;

    let stage = planner.prepare(&zones, graph)?;
    let report = PathsReport::new(
        &stage.registry,
        &stage.paths,
        stage.matrix.rows(),
        stage.warnings,
    );
    print_json(&report)
}

fn load_snapshot(path: Option<&Path>, zones: &[Zone]) -> Result<Option<AdjacencyGraph>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let snapshot = CostMatrixSnapshot::load(path)
        .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
    snapshot
        .check_against(zones)
        .context("Snapshot does not match the dataset")?;
    Ok(Some(snapshot.to_graph()?))
}

fn write_file(path: &Path, contents: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
