//! Error types for the orchestrator.
//!
//! Every variant is fatal to the current run except `UnsupportedPlatform`,
//! which callers report as a diagnostic and then stop cleanly.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while provisioning, building, assembling or launching.
#[derive(Debug, Error)]
pub enum Error {
  /// Archive download failed (unreachable host, bad status, truncated body).
  #[error("fetch failed for {url}: {message}")]
  Network { url: String, message: String },

  /// Downloaded archive does not match its pinned checksum.
  #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
  HashMismatch {
    url: String,
    expected: String,
    actual: String,
  },

  /// Archive could not be read or extracted.
  #[error("failed to extract {}: {message}", path.display())]
  Archive { path: PathBuf, message: String },

  /// Filesystem operation failed.
  #[error("{}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A declared artifact was not produced by the build.
  #[error("missing artifact for {target}: {}", path.display())]
  MissingArtifact { target: String, path: PathBuf },

  /// Header patch addressed a line the file does not have.
  #[error("cannot patch line {line_index} of {}: file has {line_count} lines", path.display())]
  PatchOutOfRange {
    path: PathBuf,
    line_index: usize,
    line_count: usize,
  },

  /// Native build tool could not be started or exited unsuccessfully.
  #[error("build of {target} failed: {program} {message}")]
  BuildFailure {
    target: String,
    program: String,
    /// Exit code, absent when the tool never started or was killed.
    code: Option<i32>,
    message: String,
  },

  /// Host platform is not one of the supported set.
  #[error("unsupported platform: {0}")]
  UnsupportedPlatform(String),

  /// Assembled executable could not be started.
  #[error("failed to launch {}: {message}", path.display())]
  Launch { path: PathBuf, message: String },
}

impl Error {
  /// Wraps an I/O error with the path it concerns.
  pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
    Error::Io {
      path: path.as_ref().to_path_buf(),
      source,
    }
  }

  /// Process exit code reported for this failure.
  ///
  /// 1 and 2 are left to generic failures and command-line usage errors.
  pub fn exit_code(&self) -> i32 {
    match self {
      Error::UnsupportedPlatform(_) => 0,
      Error::Network { .. } | Error::HashMismatch { .. } => 3,
      Error::Archive { .. } => 4,
      Error::Io { .. } | Error::MissingArtifact { .. } | Error::PatchOutOfRange { .. } => 5,
      Error::BuildFailure { .. } => 6,
      Error::Launch { .. } => 7,
    }
  }
}

/// Extension for attaching a path to `std::io::Result`.
pub(crate) trait IoResultExt<T> {
  fn at(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
  fn at(self, path: impl AsRef<Path>) -> Result<T> {
    self.map_err(|e| Error::io(path, e))
  }
}

/// Result type for orchestrator operations
pub type Result<T> = std::result::Result<T, Error>;
