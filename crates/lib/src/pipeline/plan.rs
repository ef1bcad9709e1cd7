//! Side-effect free description of what a pipeline run would do.

use std::path::PathBuf;

use serde::Serialize;

use super::PipelineConfig;
use crate::assemble::ArtifactRule;
use crate::build::BuildConfiguration;
use crate::deps::is_provisioned;
use crate::platform::HostPlatform;

#[derive(Debug, Clone, Serialize)]
pub struct PlannedDependency {
  pub name: String,
  pub marker: PathBuf,
  /// True when the marker exists and nothing will be downloaded.
  pub cached: bool,
  pub urls: Vec<String>,
  pub patched: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedTarget {
  pub name: String,
  pub configuration: BuildConfiguration,
  pub commands: Vec<String>,
  pub output_dir: Option<PathBuf>,
  pub artifacts: Vec<ArtifactRule>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
  pub platform: HostPlatform,
  pub dependencies: Vec<PlannedDependency>,
  pub configure: Vec<String>,
  pub targets: Vec<PlannedTarget>,
  pub intermediates: Vec<PathBuf>,
  pub launch: Option<PathBuf>,
}

impl Plan {
  /// Describe `config`; only reads the dependency markers.
  pub fn from_config(config: &PipelineConfig, launch: bool) -> Self {
    let dependencies = config
      .dependencies
      .iter()
      .map(|dep| PlannedDependency {
        name: dep.name.clone(),
        marker: config.dependencies_root.join(&dep.marker),
        cached: is_provisioned(dep, &config.dependencies_root),
        urls: dep.archives.iter().map(|a| a.url.clone()).collect(),
        patched: dep.patch.is_some(),
      })
      .collect();

    let targets = config
      .targets
      .iter()
      .map(|target| PlannedTarget {
        name: target.name().to_string(),
        configuration: target.build.configuration,
        commands: target.build.invocations.iter().map(|i| i.command_line()).collect(),
        output_dir: config.output.target_dir(target.name()).cloned(),
        artifacts: target.artifacts.clone(),
      })
      .collect();

    Self {
      platform: config.platform,
      dependencies,
      configure: config.configure.iter().map(|i| i.command_line()).collect(),
      targets,
      intermediates: config.intermediates.clone(),
      launch: if launch { config.launch_executable() } else { None },
    }
  }

  /// Number of dependencies that would be downloaded.
  pub fn downloads(&self) -> usize {
    self.dependencies.iter().filter(|d| !d.cached).count()
  }
}
