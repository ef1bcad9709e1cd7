//! Names and locations that are fixed for the product being built.

/// Client binary and scheme name.
pub const CLIENT: &str = "Terralistic";

/// Server binary and scheme name.
pub const SERVER: &str = "Terralistic-server";

/// Directory (relative to the project root) holding provisioned dependencies.
pub const DEPENDENCIES_DIR: &str = "Dependencies";

/// Directory (relative to the project root) used as the CMake build tree.
pub const BUILD_DIR: &str = "Build";

/// Directory (relative to the project root) receiving the assembled output.
pub const OUTPUT_DIR: &str = "Output";

/// Resource bundle produced next to the binaries by the build.
pub const RESOURCES_DIR: &str = "Resources";

pub const ENV_DEPENDENCIES_DIR: &str = "TERRABUILD_DEPENDENCIES_DIR";
pub const ENV_BUILD_DIR: &str = "TERRABUILD_BUILD_DIR";
pub const ENV_OUTPUT_DIR: &str = "TERRABUILD_OUTPUT_DIR";
pub const ENV_VSDEVCMD: &str = "TERRABUILD_VSDEVCMD";
pub const ENV_GIT_USR_BIN: &str = "TERRABUILD_GIT_USR_BIN";

/// Visual Studio developer prompt used to set up the MSVC environment.
pub const DEFAULT_VSDEVCMD: &str =
  "C:/Program Files (x86)/Microsoft Visual Studio/2019/Community/Common7/Tools/VsDevCmd.bat";

/// Git for Windows ships the `patch` binary the client shells out to at runtime.
pub const DEFAULT_GIT_USR_BIN: &str = "C:/Program Files/Git/usr/bin";
