//! Native build tool invocation.
//!
//! Build tools run with inherited stdout/stderr so their output reaches the
//! operator as-is. Only the exit status is interpreted.

use tokio::process::Command;
use tracing::{info, warn};

use super::types::{BuildTarget, Invocation};
use crate::error::{Error, Result};

/// Number of parallel jobs handed to the build tool.
pub fn default_jobs() -> usize {
  num_cpus::get().max(1)
}

/// Run one invocation on behalf of `target`.
///
/// A spawn failure or non-zero exit is a [`Error::BuildFailure`].
pub async fn invoke(invocation: &Invocation, target: &str) -> Result<()> {
  info!(build_target = %target, cwd = ?invocation.cwd, "running {}", invocation.command_line());

  tokio::fs::create_dir_all(&invocation.cwd)
    .await
    .map_err(|e| Error::io(&invocation.cwd, e))?;

  let mut command = Command::new(&invocation.program);
  command.current_dir(&invocation.cwd);
  push_args(&mut command, invocation);

  let failure = |code, message: String| Error::BuildFailure {
    target: target.to_string(),
    program: invocation.program.clone(),
    code,
    message,
  };

  let status = command.status().await.map_err(|e| {
    warn!(program = %invocation.program, error = %e, "failed to spawn build tool");
    failure(None, format!("could not be started: {e}"))
  })?;

  if !status.success() {
    let message = match status.code() {
      Some(code) => format!("exited with code {code}"),
      None => "was terminated by a signal".to_string(),
    };
    return Err(failure(status.code(), message));
  }

  Ok(())
}

#[cfg(windows)]
fn push_args(command: &mut Command, invocation: &Invocation) {
  if invocation.verbatim {
    command.raw_arg(invocation.args.join(" "));
  } else {
    command.args(&invocation.args);
  }
}

#[cfg(not(windows))]
fn push_args(command: &mut Command, invocation: &Invocation) {
  command.args(&invocation.args);
}

/// Run every invocation of `target` in order, stopping at the first failure.
pub async fn build_target(target: &BuildTarget) -> Result<()> {
  info!(
    build_target = %target.name,
    configuration = %target.configuration,
    steps = target.invocations.len(),
    "building target"
  );

  for invocation in &target.invocations {
    invoke(invocation, &target.name).await?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::build::BuildConfiguration;
  use crate::util::testutil::{shell_cmd, touch_file};
  use tempfile::TempDir;

  fn invocation((program, args): (&str, Vec<String>), cwd: &std::path::Path) -> Invocation {
    Invocation::new(program, cwd).args(args)
  }

  #[test]
  fn jobs_is_at_least_one() {
    assert!(default_jobs() >= 1);
  }

  #[tokio::test]
  async fn successful_invocation_runs_in_cwd() {
    let temp = TempDir::new().unwrap();
    let build_dir = temp.path().join("Build");

    invoke(&invocation(touch_file("built"), &build_dir), "Terralistic")
      .await
      .unwrap();

    assert!(build_dir.join("built").exists());
  }

  #[tokio::test]
  async fn non_zero_exit_is_a_build_failure() {
    let temp = TempDir::new().unwrap();

    let err = invoke(&invocation(shell_cmd("exit 3"), temp.path()), "Terralistic-server")
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      Error::BuildFailure { ref target, code: Some(3), .. } if target == "Terralistic-server"
    ));
  }

  #[tokio::test]
  async fn missing_tool_is_a_build_failure() {
    let temp = TempDir::new().unwrap();
    let inv = Invocation::new("terrabuild-no-such-tool", temp.path());

    let err = invoke(&inv, "Terralistic").await.unwrap_err();

    assert!(matches!(err, Error::BuildFailure { code: None, .. }));
    // the operator sees why the tool could not start
    assert!(err.to_string().contains("could not be started: "), "{err}");
    assert!(err.to_string().contains("terrabuild-no-such-tool"), "{err}");
  }

  #[tokio::test]
  async fn later_steps_do_not_run_after_a_failure() {
    let temp = TempDir::new().unwrap();
    let target = BuildTarget {
      name: "Terralistic".to_string(),
      build_dir: temp.path().to_path_buf(),
      configuration: BuildConfiguration::Release,
      invocations: vec![
        invocation(shell_cmd("exit 1"), temp.path()),
        invocation(touch_file("should-not-exist"), temp.path()),
      ],
    };

    assert!(build_target(&target).await.is_err());
    assert!(!temp.path().join("should-not-exist").exists());
  }
}
