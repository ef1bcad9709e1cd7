//! The build pipeline.
//!
//! One pipeline type runs every platform; a [`PipelineConfig`] supplies the
//! per-platform data. Stages run strictly in order and the first error ends
//! the run:
//!
//! ```text
//! Start -> PlatformSelected -> DependenciesProvisioned -> Built -> Assembled -> [Launched] -> Done
//! ```
//!
//! Every target is built before any output directory is touched, so a build
//! failure leaves the previous output tree exactly as it was.

mod config;
mod plan;

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

pub use config::{PipelineConfig, Target};
pub use plan::{Plan, PlannedDependency, PlannedTarget};

use crate::assemble::assemble;
use crate::build::{build_target, invoke};
use crate::deps::{Provisioned, ensure};
use crate::error::{Error, Result};
use crate::launch::launch;
use crate::platform::HostPlatform;
use crate::util::fs::remove_path;

/// Pipeline progress, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
  Start,
  PlatformSelected,
  DependenciesProvisioned,
  Built,
  Assembled,
  Launched,
  Done,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Stage::Start => "start",
      Stage::PlatformSelected => "platform selected",
      Stage::DependenciesProvisioned => "dependencies provisioned",
      Stage::Built => "built",
      Stage::Assembled => "assembled",
      Stage::Launched => "launched",
      Stage::Done => "done",
    })
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
  /// Start the assembled client after a successful build.
  pub launch: bool,
}

/// Summary of an assembled target.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledTarget {
  pub name: String,
  pub dir: PathBuf,
  pub artifacts: usize,
}

/// What a successful run did.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
  pub platform: HostPlatform,
  pub stage: Stage,
  pub dependencies: Vec<(String, Provisioned)>,
  pub built: Vec<String>,
  pub assembled: Vec<AssembledTarget>,
  pub launched: Option<u32>,
  #[serde(skip)]
  pub elapsed: Duration,
}

/// A selected platform's pipeline, ready to run.
#[derive(Debug, Clone)]
pub struct Pipeline {
  config: PipelineConfig,
}

impl Pipeline {
  pub fn new(config: PipelineConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  /// Describe the run without performing it.
  pub fn plan(&self, options: &RunOptions) -> Plan {
    Plan::from_config(&self.config, options.launch)
  }

  /// Run every stage in order.
  pub async fn run(&self, options: &RunOptions) -> Result<PipelineReport> {
    let started = Instant::now();
    let mut report = PipelineReport {
      platform: self.config.platform,
      stage: Stage::Start,
      dependencies: Vec::new(),
      built: Vec::new(),
      assembled: Vec::new(),
      launched: None,
      elapsed: Duration::ZERO,
    };
    advance(&mut report, Stage::PlatformSelected);

    let result = self.run_stages(options, &mut report).await;
    report.elapsed = started.elapsed();

    match result {
      Ok(()) => {
        advance(&mut report, Stage::Done);
        Ok(report)
      }
      Err(e) => {
        warn!(completed = %report.stage, error = %e, "pipeline failed");
        Err(e)
      }
    }
  }

  async fn run_stages(&self, options: &RunOptions, report: &mut PipelineReport) -> Result<()> {
    let config = &self.config;

    for dependency in &config.dependencies {
      let outcome = ensure(dependency, &config.dependencies_root).await?;
      report.dependencies.push((dependency.name.clone(), outcome));
    }
    advance(report, Stage::DependenciesProvisioned);

    for step in &config.configure {
      invoke(step, "configure").await?;
    }
    for target in &config.targets {
      build_target(&target.build).await?;
      report.built.push(target.name().to_string());
    }
    advance(report, Stage::Built);

    for target in &config.targets {
      let artifacts = assemble(&config.output, target.name(), &target.artifacts)?;
      report.assembled.push(AssembledTarget {
        name: target.name().to_string(),
        dir: config.output.target_dir(target.name()).cloned().unwrap_or_default(),
        artifacts: artifacts.len(),
      });
    }
    self.remove_intermediates()?;
    advance(report, Stage::Assembled);

    if options.launch {
      let executable = config.launch_executable().ok_or_else(|| Error::Launch {
        path: PathBuf::from(&config.launch.target),
        message: "no output directory for launch target".to_string(),
      })?;
      let cwd = config.output.target_dir(&config.launch.target).cloned().unwrap_or_default();
      report.launched = Some(launch(&executable, &cwd)?);
      advance(report, Stage::Launched);
    }

    Ok(())
  }

  fn remove_intermediates(&self) -> Result<()> {
    for path in &self.config.intermediates {
      if path.symlink_metadata().is_ok() {
        remove_path(path)?;
        debug!(path = ?path, "removed intermediate");
      }
    }
    Ok(())
  }
}

fn advance(report: &mut PipelineReport, stage: Stage) {
  debug!(from = %report.stage, to = %stage, "pipeline stage");
  report.stage = stage;
  if stage == Stage::Done {
    info!(platform = %report.platform, elapsed = ?report.elapsed, "pipeline finished");
  }
}
