use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Host platforms that have a build pipeline.
///
/// The set is closed: supporting another platform means adding a variant here
/// and a matching arm in [`crate::pipeline::PipelineConfig::for_platform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
  Linux,
  MacOs,
  Windows,
}

impl HostPlatform {
  /// Resolve a platform identity string.
  ///
  /// Accepts `std::env::consts::OS` names plus the `darwin` and `win32`
  /// spellings used by other tooling.
  pub fn from_id(id: &str) -> Result<Self> {
    match id {
      "linux" => Ok(Self::Linux),
      "macos" | "darwin" => Ok(Self::MacOs),
      "windows" | "win32" => Ok(Self::Windows),
      other => Err(Error::UnsupportedPlatform(other.to_string())),
    }
  }

  /// Detect the platform this process runs on
  pub fn detect() -> Result<Self> {
    Self::from_id(std::env::consts::OS)
  }

  /// Returns the lowercase identifier for this platform
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "macos",
      Self::Windows => "windows",
    }
  }

  /// Name of this platform's directory under `Output/`.
  pub fn output_dir_name(&self) -> &'static str {
    match self {
      Self::Linux => "Linux",
      Self::MacOs => "MacOS",
      Self::Windows => "Windows",
    }
  }

  /// File name of an executable called `name` on this platform.
  pub fn executable_name(&self, name: &str) -> String {
    match self {
      Self::Windows => format!("{name}.exe"),
      Self::Linux | Self::MacOs => name.to_string(),
    }
  }
}

impl fmt::Display for HostPlatform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
