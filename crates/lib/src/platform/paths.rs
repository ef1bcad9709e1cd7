use std::path::PathBuf;

use serde::Serialize;

use crate::consts::{
  BUILD_DIR, DEFAULT_GIT_USR_BIN, DEFAULT_VSDEVCMD, DEPENDENCIES_DIR, ENV_BUILD_DIR, ENV_DEPENDENCIES_DIR,
  ENV_GIT_USR_BIN, ENV_OUTPUT_DIR, ENV_VSDEVCMD, OUTPUT_DIR,
};

/// Directories the orchestrator reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectPaths {
  /// Source tree handed to the native build tool.
  pub root: PathBuf,
  /// Dependency cache, one entry per provisioned dependency.
  pub dependencies: PathBuf,
  /// CMake build tree.
  pub build: PathBuf,
  /// Assembled output, one subdirectory per platform.
  pub output: PathBuf,
}

impl ProjectPaths {
  /// Project-relative defaults, ignoring the environment.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    let root = root.into();
    Self {
      dependencies: root.join(DEPENDENCIES_DIR),
      build: root.join(BUILD_DIR),
      output: root.join(OUTPUT_DIR),
      root,
    }
  }

  /// Defaults for `root` with `TERRABUILD_*_DIR` overrides applied.
  pub fn resolve(root: impl Into<PathBuf>) -> Self {
    let defaults = Self::new(root);
    Self {
      dependencies: env_path(ENV_DEPENDENCIES_DIR).unwrap_or(defaults.dependencies),
      build: env_path(ENV_BUILD_DIR).unwrap_or(defaults.build),
      output: env_path(ENV_OUTPUT_DIR).unwrap_or(defaults.output),
      root: defaults.root,
    }
  }
}

/// Host programs outside the project that a pipeline relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostTools {
  /// `VsDevCmd.bat`, sourced before every MSVC build command.
  pub vsdevcmd: PathBuf,
  /// Git for Windows `usr/bin`, source of `patch.exe` and its runtime.
  pub git_usr_bin: PathBuf,
}

impl HostTools {
  pub fn current() -> Self {
    Self {
      vsdevcmd: env_path(ENV_VSDEVCMD).unwrap_or_else(|| PathBuf::from(DEFAULT_VSDEVCMD)),
      git_usr_bin: env_path(ENV_GIT_USR_BIN).unwrap_or_else(|| PathBuf::from(DEFAULT_GIT_USR_BIN)),
    }
  }
}

fn env_path(var: &str) -> Option<PathBuf> {
  std::env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use temp_env::with_vars;

  #[test]
  #[serial]
  fn defaults_are_relative_to_root() {
    with_vars(
      [
        (ENV_DEPENDENCIES_DIR, None::<&str>),
        (ENV_BUILD_DIR, None::<&str>),
        (ENV_OUTPUT_DIR, None::<&str>),
      ],
      || {
        let paths = ProjectPaths::resolve("/src/terralistic");
        assert_eq!(paths, ProjectPaths::new("/src/terralistic"));
        assert_eq!(paths.dependencies, PathBuf::from("/src/terralistic/Dependencies"));
        assert_eq!(paths.build, PathBuf::from("/src/terralistic/Build"));
        assert_eq!(paths.output, PathBuf::from("/src/terralistic/Output"));
      },
    );
  }

  #[test]
  #[serial]
  fn env_var_overrides_default_paths() {
    with_vars(
      [
        (ENV_DEPENDENCIES_DIR, Some("/cache/deps")),
        (ENV_BUILD_DIR, None),
        (ENV_OUTPUT_DIR, Some("/dist")),
      ],
      || {
        let paths = ProjectPaths::resolve("/src/terralistic");
        assert_eq!(paths.dependencies, PathBuf::from("/cache/deps"));
        assert_eq!(paths.build, PathBuf::from("/src/terralistic/Build"));
        assert_eq!(paths.output, PathBuf::from("/dist"));
      },
    );
  }

  #[test]
  #[serial]
  fn empty_override_falls_back_to_default() {
    with_vars([(ENV_VSDEVCMD, Some("")), (ENV_GIT_USR_BIN, Some("D:/Git/usr/bin"))], || {
      let tools = HostTools::current();
      assert_eq!(tools.vsdevcmd, PathBuf::from(DEFAULT_VSDEVCMD));
      assert_eq!(tools.git_usr_bin, PathBuf::from("D:/Git/usr/bin"));
    });
  }
}
