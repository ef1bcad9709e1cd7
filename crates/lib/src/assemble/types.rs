use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::platform::HostPlatform;

/// What an artifact is; decides how it is laid out in the output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
  Executable,
  SharedLibrary,
  /// A directory copied or moved with its structure intact.
  ResourceTree,
  DataFile,
}

impl ArtifactKind {
  pub fn is_tree(&self) -> bool {
    matches!(self, Self::ResourceTree)
  }
}

impl fmt::Display for ArtifactKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Executable => "executable",
      Self::SharedLibrary => "shared library",
      Self::ResourceTree => "resource tree",
      Self::DataFile => "data file",
    })
  }
}

/// How an artifact reaches the output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transfer {
  /// Source stays in place, e.g. for a bundle another target also needs.
  Copy,
  /// Source is consumed; avoids holding large trees twice.
  Move,
}

/// A single build output placed into a target's output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
  pub kind: ArtifactKind,
  pub source: PathBuf,
  /// Relative to the target's output directory; empty means the directory itself.
  pub destination: PathBuf,
  pub transfer: Transfer,
}

impl Artifact {
  pub fn copy(kind: ArtifactKind, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
    Self {
      kind,
      source: source.into(),
      destination: destination.into(),
      transfer: Transfer::Copy,
    }
  }

  pub fn moved(kind: ArtifactKind, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
    Self {
      transfer: Transfer::Move,
      ..Self::copy(kind, source, destination)
    }
  }
}

/// How a target declares its artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum ArtifactRule {
  /// Exactly this artifact; missing at assembly time is an error.
  Declared(Artifact),
  /// Every file directly in `dir` ending in `.{extension}`, placed flat at
  /// the top of the output directory. Matching nothing is fine.
  Collect {
    kind: ArtifactKind,
    dir: PathBuf,
    extension: String,
    transfer: Transfer,
  },
}

impl From<Artifact> for ArtifactRule {
  fn from(artifact: Artifact) -> Self {
    ArtifactRule::Declared(artifact)
  }
}

/// Output directories for one platform's targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputTree {
  pub platform: HostPlatform,
  /// `Output/<Platform>/`
  pub root: PathBuf,
  /// Target name to the directory it is assembled into.
  pub per_target: BTreeMap<String, PathBuf>,
}

impl OutputTree {
  pub fn new(platform: HostPlatform, output_root: impl Into<PathBuf>) -> Self {
    Self {
      platform,
      root: output_root.into().join(platform.output_dir_name()),
      per_target: BTreeMap::new(),
    }
  }

  /// Register `target` under `dir_name` inside the platform directory.
  pub fn with_target(mut self, target: impl Into<String>, dir_name: impl AsRef<std::path::Path>) -> Self {
    let dir = self.root.join(dir_name);
    self.per_target.insert(target.into(), dir);
    self
  }

  pub fn target_dir(&self, target: &str) -> Option<&PathBuf> {
    self.per_target.get(target)
  }
}
