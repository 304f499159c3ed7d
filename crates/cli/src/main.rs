//! gb - minimal ninja-style build runner.
//!
//! Reads a `build.ninja`-style file from the working directory, resolves the
//! dependency graph, and runs the commands needed to bring the requested
//! targets up to date. Exits zero on full success, non-zero with an
//! `error: <description>` diagnostic on stderr otherwise.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use graphbuild_lib::consts::BUILD_FILE_NAME;
use graphbuild_lib::execute::{ExecuteConfig, execute_plan};
use graphbuild_lib::graph::{ExecutionDag, Graph};
use graphbuild_lib::ninja;
use graphbuild_lib::plan::compute_plan;

mod output;

/// Build requested targets from a ninja-style build file.
#[derive(Parser)]
#[command(name = "gb")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Targets to bring up to date (default: the build file's `default`
  /// targets, else every terminal output)
  targets: Vec<String>,

  /// Path to the build file
  #[arg(short, long, default_value = BUILD_FILE_NAME)]
  file: PathBuf,

  /// Maximum number of concurrently running commands
  #[arg(short, long)]
  jobs: Option<usize>,

  /// Print the commands that would run, without running them
  #[arg(short = 'n', long)]
  dry_run: bool,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

fn main() {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .without_time()
    .init();

  if let Err(e) = run(&cli) {
    output::print_error(&e.to_string());
    std::process::exit(1);
  }
}

fn run(cli: &Cli) -> Result<()> {
  let file = ninja::load(&cli.file)?;
  let dir = std::env::current_dir().context("couldn't get current working directory")?;

  let graph = Graph::resolve(&file, dir)?;
  let dag = ExecutionDag::from_graph(&graph)?;
  let plan = compute_plan(&graph, &dag, &cli.targets)?;

  if plan.is_empty() {
    println!("gb: no work to do.");
    return Ok(());
  }

  if cli.dry_run {
    for edge in plan.edges() {
      println!("{}", graph.command(edge));
    }
    return Ok(());
  }

  let mut config = ExecuteConfig::default();
  if let Some(jobs) = cli.jobs {
    config.parallelism = jobs.max(1);
  }

  let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
  let report = rt.block_on(execute_plan(&graph, &plan, &config));

  match report.failed {
    Some((_, err)) => Err(err.into()),
    None => Ok(()),
  }
}
