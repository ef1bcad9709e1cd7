//! Post-build launch of the assembled client.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};

/// What to start when the `run` directive is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchSpec {
  /// Target whose output directory holds the executable.
  pub target: String,
  /// Executable path relative to that output directory.
  pub executable: PathBuf,
}

/// Start `executable` with `cwd` as its working directory and return its pid.
///
/// The child is detached from this process's lifetime: it is not waited on
/// and keeps running after the orchestrator exits.
pub fn launch(executable: &Path, cwd: &Path) -> Result<u32> {
  if !executable.is_file() {
    return Err(Error::Launch {
      path: executable.to_path_buf(),
      message: "executable not found".to_string(),
    });
  }

  let child = Command::new(executable)
    .current_dir(cwd)
    .stdin(Stdio::null())
    .spawn()
    .map_err(|e| Error::Launch {
      path: executable.to_path_buf(),
      message: e.to_string(),
    })?;

  info!(path = ?executable, pid = child.id(), "launched client");
  Ok(child.id())
}
