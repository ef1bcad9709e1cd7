use std::path::PathBuf;

use serde::Serialize;

use crate::fetch::ArchiveSource;

/// A third-party binary dependency provisioned into the dependency root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
  /// Name used in logs and diagnostics.
  pub name: String,
  /// Archives extracted, in order, into `extract_subdir`.
  pub archives: Vec<ArchiveSource>,
  /// Directory under the dependency root that archives are extracted into.
  /// Empty when the archive carries its own top-level directory.
  pub extract_subdir: PathBuf,
  /// Directory under the dependency root whose existence means "provisioned".
  pub marker: PathBuf,
  /// Edit applied once, right after a fresh download.
  pub patch: Option<PatchSpec>,
}

impl Dependency {
  /// A dependency made of a single archive that unpacks to `marker`.
  pub fn single(name: impl Into<String>, archive: ArchiveSource, marker: impl Into<PathBuf>) -> Self {
    Self {
      name: name.into(),
      archives: vec![archive],
      extract_subdir: PathBuf::new(),
      marker: marker.into(),
      patch: None,
    }
  }

  /// A dependency whose archives are unpacked together into `dir`.
  pub fn bundle(name: impl Into<String>, archives: Vec<ArchiveSource>, dir: impl Into<PathBuf>) -> Self {
    let dir = dir.into();
    Self {
      name: name.into(),
      archives,
      extract_subdir: dir.clone(),
      marker: dir,
      patch: None,
    }
  }

  pub fn with_patch(mut self, patch: PatchSpec) -> Self {
    self.patch = Some(patch);
    self
  }
}

/// Replace one line of a file, addressed by zero-based index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchSpec {
  /// File to edit, relative to the dependency root.
  pub target_file: PathBuf,
  pub line_index: usize,
  /// Literal replacement, including its line terminator.
  pub replacement_line: String,
}

/// Outcome of [`super::ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provisioned {
  /// Marker was already present; nothing was downloaded.
  Cached,
  /// Archives were downloaded and extracted during this call.
  Fetched,
}
