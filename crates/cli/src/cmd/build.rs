//! Implementation of the default `terrabuild` command.
//!
//! Provisions dependencies, builds both targets, assembles the output tree and,
//! with the `run` directive, starts the client.

use anyhow::{Context, Result};

use terrabuild_lib::deps::Provisioned;
use terrabuild_lib::pipeline::{Pipeline, RunOptions};

use crate::output::{format_duration, print_info, print_stat, print_success};

pub fn cmd_build(pipeline: &Pipeline, options: &RunOptions) -> Result<()> {
  let config = pipeline.config();
  print_info(&format!(
    "Building {} target(s) for {}",
    config.targets.len(),
    config.platform
  ));

  // Stages run one after another; a single thread is enough.
  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;
  let report = rt.block_on(pipeline.run(options))?;

  let fetched = report
    .dependencies
    .iter()
    .filter(|(_, outcome)| *outcome == Provisioned::Fetched)
    .count();

  println!();
  print_success(&format!("Build complete for {}", report.platform));
  print_stat(
    "Dependencies",
    &format!("{} ({} fetched, {} cached)", report.dependencies.len(), fetched, report.dependencies.len() - fetched),
  );
  for target in &report.assembled {
    print_stat(&target.name, &format!("{} ({} artifacts)", target.dir.display(), target.artifacts));
  }
  if let Some(pid) = report.launched {
    print_stat("Launched", &format!("pid {pid}"));
  }
  print_stat("Elapsed", &format_duration(report.elapsed));

  Ok(())
}
