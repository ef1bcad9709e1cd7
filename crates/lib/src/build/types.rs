use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Build configuration passed to the native build tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildConfiguration {
  /// Whatever the tool picks when no configuration is given.
  ToolDefault,
  Release,
}

impl fmt::Display for BuildConfiguration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::ToolDefault => "tool default",
      Self::Release => "release",
    })
  }
}

/// One out-of-process command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,
  /// Pass `args` to the process verbatim instead of quoting each one.
  /// Only meaningful on Windows, where `cmd.exe` parses its own command line.
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub verbatim: bool,
}

impl Invocation {
  pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.into(),
      verbatim: false,
    }
  }

  /// Run `script` through `cmd.exe`, letting `&&` chain environment setup
  /// (e.g. `VsDevCmd.bat`) with the commands that need it.
  pub fn cmd_script(script: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      program: "cmd.exe".to_string(),
      args: vec!["/S".to_string(), "/C".to_string(), format!("\"{}\"", script.into())],
      cwd: cwd.into(),
      verbatim: true,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// Shell-like rendering for logs and plans.
  pub fn command_line(&self) -> String {
    if self.verbatim {
      return std::iter::once(self.program.as_str())
        .chain(self.args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    }
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .map(|part| {
        if part.contains(' ') && !part.starts_with('"') {
          format!("\"{part}\"")
        } else {
          part.to_string()
        }
      })
      .collect::<Vec<_>>()
      .join(" ")
  }
}

/// One binary the pipeline produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
  /// Binary (and output directory) name.
  pub name: String,
  /// Where the build tool leaves this target's outputs.
  pub build_dir: PathBuf,
  pub configuration: BuildConfiguration,
  /// Commands run in order to produce the target.
  pub invocations: Vec<Invocation>,
}
