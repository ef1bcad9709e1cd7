//! Implementation of `terrabuild --dry-run`.
//!
//! Prints what a run would download, execute and write without touching the
//! network or the filesystem.

use anyhow::Result;

use terrabuild_lib::pipeline::{Pipeline, RunOptions};

use crate::output::{print_info, print_item, print_json, print_stat, symbols};

pub fn cmd_plan(pipeline: &Pipeline, options: &RunOptions, json: bool) -> Result<()> {
  let plan = pipeline.plan(options);

  if json {
    return print_json(&plan);
  }

  print_info(&format!("Dry run for {}", plan.platform));

  println!();
  println!("Dependencies:");
  for dep in &plan.dependencies {
    if dep.cached {
      print_item(symbols::SUCCESS, &format!("{} (cached at {})", dep.name, dep.marker.display()));
    } else {
      let patched = if dep.patched { ", patched after download" } else { "" };
      print_item(symbols::ADD, &format!("{} ({}{})", dep.name, dep.urls.join(", "), patched));
    }
  }

  if !plan.configure.is_empty() {
    println!();
    println!("Configure:");
    for command in &plan.configure {
      print_item(symbols::ARROW, command);
    }
  }

  for target in &plan.targets {
    println!();
    println!("Target {} [{}]:", target.name, target.configuration);
    for command in &target.commands {
      print_item(symbols::ARROW, command);
    }
    if let Some(dir) = &target.output_dir {
      print_stat("Output", &dir.display().to_string());
    }
    print_stat("Artifact rules", &target.artifacts.len().to_string());
  }

  println!();
  for path in &plan.intermediates {
    print_stat("Cleanup", &path.display().to_string());
  }
  if let Some(exe) = &plan.launch {
    print_stat("Launch", &exe.display().to_string());
  }
  print_stat("Downloads", &plan.downloads().to_string());

  Ok(())
}
