//! CLI smoke tests for terrabuild.
//!
//! These tests exercise argument handling, dry runs and failure exit codes
//! without network access or a native toolchain.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the terrabuild binary.
fn terrabuild_cmd() -> Command {
  let mut cmd = cargo_bin_cmd!("terrabuild");
  for var in [
    "TERRABUILD_PROJECT_DIR",
    "TERRABUILD_JOBS",
    "TERRABUILD_PLATFORM",
    "TERRABUILD_DEPENDENCIES_DIR",
    "TERRABUILD_BUILD_DIR",
    "TERRABUILD_OUTPUT_DIR",
  ] {
    cmd.env_remove(var);
  }
  cmd
}

fn is_empty_dir(dir: &std::path::Path) -> bool {
  std::fs::read_dir(dir).unwrap().next().is_none()
}

fn dry_run_json(temp: &TempDir, platform: &str, extra: &[&str]) -> serde_json::Value {
  let output = terrabuild_cmd()
    .args(["--platform", platform, "--dry-run", "--json", "-C"])
    .arg(temp.path())
    .args(extra)
    .output()
    .unwrap();
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  serde_json::from_slice(&output.stdout).unwrap()
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  terrabuild_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"))
    .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn version_flag_works() {
  terrabuild_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("terrabuild"));
}

#[test]
fn unknown_directive_is_rejected() {
  terrabuild_cmd().arg("deploy").assert().failure();
}

#[test]
fn json_requires_dry_run() {
  terrabuild_cmd().arg("--json").assert().failure();
}

#[test]
fn zero_jobs_is_rejected() {
  // usage errors keep clap's code, which no pipeline failure shares
  terrabuild_cmd().args(["--dry-run", "-j", "0"]).assert().code(2);
}

// =============================================================================
// Unsupported platform
// =============================================================================

#[test]
fn unsupported_platform_is_a_clean_no_op() {
  let temp = TempDir::new().unwrap();

  terrabuild_cmd()
    .args(["--platform", "plan9", "-C"])
    .arg(temp.path())
    .assert()
    .success()
    .stderr(predicate::str::contains("plan9"));

  assert!(is_empty_dir(temp.path()));
}

#[test]
fn unsupported_platform_from_env() {
  let temp = TempDir::new().unwrap();

  terrabuild_cmd()
    .env("TERRABUILD_PLATFORM", "freebsd")
    .env("TERRABUILD_PROJECT_DIR", temp.path())
    .arg("run")
    .assert()
    .success()
    .stderr(predicate::str::contains("freebsd"));

  assert!(is_empty_dir(temp.path()));
}

// =============================================================================
// Dry run
// =============================================================================

#[test]
fn windows_dry_run_lists_dependencies_and_targets() {
  let temp = TempDir::new().unwrap();

  let plan = dry_run_json(&temp, "windows", &[]);

  assert_eq!(plan["platform"], "windows");
  let deps = plan["dependencies"].as_array().unwrap();
  assert_eq!(deps.len(), 2);
  assert_eq!(deps[1]["name"], "zlib");
  assert_eq!(deps[1]["patched"], true);
  assert_eq!(deps[1]["cached"], false);
  let targets = plan["targets"].as_array().unwrap();
  assert_eq!(targets[0]["name"], "Terralistic");
  assert_eq!(targets[1]["name"], "Terralistic-server");
  assert!(plan["launch"].is_null());
  assert!(is_empty_dir(temp.path()));
}

#[test]
fn jobs_override_reaches_build_commands() {
  let temp = TempDir::new().unwrap();

  let plan = dry_run_json(&temp, "linux", &["-j", "3"]);

  let command = plan["targets"][0]["commands"][0].as_str().unwrap();
  assert!(command.starts_with("make -j3"), "{command}");
}

#[test]
fn run_directive_plans_a_launch() {
  let temp = TempDir::new().unwrap();

  let plan = dry_run_json(&temp, "macos", &["run"]);

  let launch = plan["launch"].as_str().unwrap();
  assert!(launch.ends_with("Terralistic"), "{launch}");
  assert!(launch.contains("Terralistic.app"), "{launch}");
}

#[test]
fn cached_dependency_is_reported() {
  let temp = TempDir::new().unwrap();
  std::fs::create_dir_all(temp.path().join("Dependencies/SFML-2.5.1")).unwrap();

  terrabuild_cmd()
    .args(["--platform", "linux", "--dry-run", "-C"])
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("SFML (cached"))
    .stdout(predicate::str::contains("Downloads: 0"));
}

// =============================================================================
// Error Handling
// =============================================================================

#[test]
fn missing_project_dir_fails() {
  let temp = TempDir::new().unwrap();

  terrabuild_cmd()
    .args(["--platform", "linux", "-C"])
    .arg(temp.path().join("nope"))
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Project directory not found"));
}

#[test]
fn failed_configure_exits_with_build_failure_code() {
  // no CMakeLists.txt here, so the configure step cannot succeed
  let temp = TempDir::new().unwrap();
  std::fs::create_dir_all(temp.path().join("Dependencies/SFML-2.5.1")).unwrap();

  terrabuild_cmd()
    .args(["--platform", "linux", "-C"])
    .arg(temp.path())
    .assert()
    .code(6)
    .stderr(predicate::str::contains("configure"));

  assert!(!temp.path().join("Output").exists());
}
