mod cmd;
mod output;

use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use terrabuild_lib::Error;
use terrabuild_lib::build::default_jobs;
use terrabuild_lib::pipeline::{Pipeline, PipelineConfig, RunOptions};
use terrabuild_lib::platform::{HostPlatform, HostTools, ProjectPaths};

use crate::output::{print_error, print_warning};

/// terrabuild - build the Terralistic client and server for this host
#[derive(Parser)]
#[command(name = "terrabuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// What to do once the build is assembled
  #[arg(value_enum)]
  directive: Option<Directive>,

  /// Project root (default: current directory)
  #[arg(short = 'C', long, env = "TERRABUILD_PROJECT_DIR")]
  project_dir: Option<PathBuf>,

  /// Parallel jobs handed to the build tool (default: CPU count)
  #[arg(short, long, env = "TERRABUILD_JOBS")]
  jobs: Option<NonZeroUsize>,

  /// Platform identity to use instead of the detected one
  #[arg(long, env = "TERRABUILD_PLATFORM", hide = true)]
  platform: Option<String>,

  /// Print the plan and exit without downloading, building or writing anything
  #[arg(long)]
  dry_run: bool,

  /// Print the plan as JSON
  #[arg(long, requires = "dry_run")]
  json: bool,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Directive {
  /// Launch the client after a successful build
  Run,
}

fn main() {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(err) = run(cli) {
    print_error(&format!("{err:#}"));
    std::process::exit(exit_code(&err));
  }
}

fn run(cli: Cli) -> Result<()> {
  let platform = match select_platform(cli.platform.as_deref()) {
    Ok(platform) => platform,
    Err(Error::UnsupportedPlatform(id)) => {
      print_warning(&format!("No build pipeline for platform '{id}', nothing to do"));
      return Ok(());
    }
    Err(e) => return Err(e.into()),
  };

  let root = match cli.project_dir {
    Some(dir) => dir,
    None => std::env::current_dir().context("Failed to determine current directory")?,
  };
  let root = dunce::canonicalize(&root)
    .with_context(|| format!("Project directory not found: {}", root.display()))?;

  let jobs = cli.jobs.map(NonZeroUsize::get).unwrap_or_else(default_jobs);
  let paths = ProjectPaths::resolve(root);
  let config = PipelineConfig::for_platform(platform, &paths, &HostTools::current(), jobs);
  let pipeline = Pipeline::new(config);
  let options = RunOptions {
    launch: cli.directive == Some(Directive::Run),
  };

  if cli.dry_run {
    cmd::cmd_plan(&pipeline, &options, cli.json)
  } else {
    cmd::cmd_build(&pipeline, &options)
  }
}

fn select_platform(id: Option<&str>) -> terrabuild_lib::Result<HostPlatform> {
  match id {
    Some(id) => HostPlatform::from_id(id),
    None => HostPlatform::detect(),
  }
}

/// Pipeline failures map to their own codes; anything else is a plain failure.
fn exit_code(err: &anyhow::Error) -> i32 {
  match err.downcast_ref::<Error>() {
    Some(e) => e.exit_code(),
    None => 1,
  }
}
