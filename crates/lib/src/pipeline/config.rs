//! Per-platform pipeline data.
//!
//! The three platforms share one orchestration; what differs is captured
//! here as data: dependency archives, build commands, output layout.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::assemble::{Artifact, ArtifactKind, ArtifactRule, OutputTree, Transfer};
use crate::build::{BuildConfiguration, BuildTarget, Invocation};
use crate::consts::{CLIENT, RESOURCES_DIR, SERVER};
use crate::deps::{Dependency, PatchSpec};
use crate::fetch::{ArchiveFormat, ArchiveSource};
use crate::launch::LaunchSpec;
use crate::platform::{HostPlatform, HostTools, ProjectPaths};

const SFML_LINUX_URL: &str = "https://www.sfml-dev.org/files/SFML-2.5.1-linux-gcc-64-bit.tar.gz";
const SFML_MACOS_URL: &str = "https://www.sfml-dev.org/files/SFML-2.5.1-macOS-clang.tar.gz";
const SFML_WINDOWS_URL: &str = "https://www.sfml-dev.org/files/SFML-2.5.1-windows-vc15-32-bit.zip";
const ZLIB_BIN_URL: &str = "https://deac-riga.dl.sourceforge.net/project/gnuwin32/zlib/1.2.3/zlib-1.2.3-bin.zip";
const ZLIB_LIB_URL: &str = "https://netix.dl.sourceforge.net/project/gnuwin32/zlib/1.2.3/zlib-1.2.3-lib.zip";

/// `zconf.h` line that pulls in `unistd.h`, which MSVC does not have.
const ZCONF_UNISTD_LINE: usize = 286;

/// A build target together with where and how its output is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
  pub build: BuildTarget,
  pub artifacts: Vec<ArtifactRule>,
}

impl Target {
  pub fn name(&self) -> &str {
    &self.build.name
  }
}

/// Everything one platform's pipeline needs to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
  pub platform: HostPlatform,
  pub dependencies_root: PathBuf,
  pub dependencies: Vec<Dependency>,
  /// Commands run once before any target is built.
  pub configure: Vec<Invocation>,
  /// Targets in build and assembly order.
  pub targets: Vec<Target>,
  pub output: OutputTree,
  /// Build by-products removed after a successful assembly.
  pub intermediates: Vec<PathBuf>,
  pub launch: LaunchSpec,
}

impl PipelineConfig {
  /// The pipeline for `platform`.
  pub fn for_platform(platform: HostPlatform, paths: &ProjectPaths, tools: &HostTools, jobs: usize) -> Self {
    match platform {
      HostPlatform::Linux => linux(paths, jobs),
      HostPlatform::MacOs => macos(paths, jobs),
      HostPlatform::Windows => windows(paths, tools, jobs),
    }
  }

  pub fn target(&self, name: &str) -> Option<&Target> {
    self.targets.iter().find(|t| t.name() == name)
  }

  /// Absolute path of the executable started by the `run` directive.
  pub fn launch_executable(&self) -> Option<PathBuf> {
    self
      .output
      .target_dir(&self.launch.target)
      .map(|dir| dir.join(&self.launch.executable))
  }
}

fn display(path: &Path) -> String {
  path.display().to_string()
}

fn linux(paths: &ProjectPaths, jobs: usize) -> PipelineConfig {
  let platform = HostPlatform::Linux;
  let build_dir = &paths.build;

  let sfml = Dependency::single(
    "SFML",
    ArchiveSource::new(SFML_LINUX_URL, ArchiveFormat::TarGz),
    "SFML-2.5.1",
  );

  let make = |name: &str| BuildTarget {
    name: name.to_string(),
    build_dir: build_dir.clone(),
    configuration: BuildConfiguration::ToolDefault,
    invocations: vec![Invocation::new("make", build_dir).arg(format!("-j{jobs}")).arg(name)],
  };

  let artifacts = |name: &str| -> Vec<ArtifactRule> {
    vec![
      Artifact::copy(ArtifactKind::ResourceTree, build_dir.join(RESOURCES_DIR), RESOURCES_DIR).into(),
      Artifact::copy(ArtifactKind::Executable, build_dir.join(name), name).into(),
    ]
  };

  PipelineConfig {
    platform,
    dependencies_root: paths.dependencies.clone(),
    dependencies: vec![sfml],
    configure: vec![Invocation::new("cmake", build_dir).arg(display(&paths.root))],
    targets: [CLIENT, SERVER]
      .into_iter()
      .map(|name| Target {
        build: make(name),
        artifacts: artifacts(name),
      })
      .collect(),
    output: OutputTree::new(platform, &paths.output)
      .with_target(CLIENT, CLIENT)
      .with_target(SERVER, SERVER),
    intermediates: Vec::new(),
    launch: LaunchSpec {
      target: CLIENT.to_string(),
      executable: CLIENT.into(),
    },
  }
}

fn macos(paths: &ProjectPaths, jobs: usize) -> PipelineConfig {
  let platform = HostPlatform::MacOs;
  let root = &paths.root;
  let project = root.join(format!("{CLIENT}.xcodeproj"));
  let export_options = root.join("exportOptions.plist");

  let sfml = Dependency::single(
    "SFML",
    ArchiveSource::new(SFML_MACOS_URL, ArchiveFormat::TarGz),
    "SFML-2.5.1-macos-clang",
  );

  let xcode = |scheme: &str, configuration: BuildConfiguration| {
    let archive = root.join(format!("{scheme}.xcarchive"));
    let export_dir = root.join(format!("{scheme}.app"));

    let mut archive_step = Invocation::new("xcodebuild", root)
      .args(["build", "-quiet", "-project"])
      .arg(display(&project))
      .args(["-scheme", scheme, "archive"]);
    if configuration == BuildConfiguration::Release {
      archive_step = archive_step.args(["-configuration", "release"]);
    }
    archive_step = archive_step
      .arg("-jobs")
      .arg(jobs.to_string())
      .arg("-archivePath")
      .arg(display(&archive));

    let export_step = Invocation::new("xcodebuild", root)
      .args(["-exportArchive", "-quiet", "-archivePath"])
      .arg(display(&archive))
      .arg("-exportPath")
      .arg(display(&export_dir))
      .arg("-exportOptionsPlist")
      .arg(display(&export_options));

    let bundle = export_dir.join(format!("{scheme}.app"));
    Target {
      build: BuildTarget {
        name: scheme.to_string(),
        build_dir: export_dir.clone(),
        configuration,
        invocations: vec![archive_step, export_step],
      },
      // the bundle becomes the output directory itself
      artifacts: vec![Artifact::moved(ArtifactKind::ResourceTree, bundle, "").into()],
    }
  };

  let intermediates = [CLIENT, SERVER]
    .iter()
    .flat_map(|scheme| [root.join(format!("{scheme}.xcarchive")), root.join(format!("{scheme}.app"))])
    .collect();

  PipelineConfig {
    platform,
    dependencies_root: paths.dependencies.clone(),
    dependencies: vec![sfml],
    configure: Vec::new(),
    targets: vec![
      xcode(CLIENT, BuildConfiguration::ToolDefault),
      xcode(SERVER, BuildConfiguration::Release),
    ],
    output: OutputTree::new(platform, &paths.output)
      .with_target(CLIENT, format!("{CLIENT}.app"))
      .with_target(SERVER, format!("{SERVER}.app")),
    intermediates,
    launch: LaunchSpec {
      target: CLIENT.to_string(),
      executable: Path::new("Contents").join("MacOS").join(CLIENT),
    },
  }
}

fn windows(paths: &ProjectPaths, tools: &HostTools, jobs: usize) -> PipelineConfig {
  let platform = HostPlatform::Windows;
  let build_dir = &paths.build;
  let vsdevcmd = format!("call \"{}\"", display(&tools.vsdevcmd));

  let sfml = Dependency::single(
    "SFML",
    ArchiveSource::new(SFML_WINDOWS_URL, ArchiveFormat::Zip),
    "SFML-2.5.1",
  );
  let zlib = Dependency::bundle(
    "zlib",
    vec![
      ArchiveSource::new(ZLIB_BIN_URL, ArchiveFormat::Zip),
      ArchiveSource::new(ZLIB_LIB_URL, ArchiveFormat::Zip),
    ],
    "zlib",
  )
  .with_patch(PatchSpec {
    target_file: Path::new("zlib").join("include").join("zconf.h"),
    line_index: ZCONF_UNISTD_LINE,
    replacement_line: "#if 0\n".to_string(),
  });

  let configure = Invocation::cmd_script(
    format!(
      "{vsdevcmd} && cmake -DCMAKE_BUILD_TYPE=Release -G \"NMake Makefiles\" \"{}\"",
      display(&paths.root)
    ),
    build_dir,
  );

  let cmake_build = |name: &str| BuildTarget {
    name: name.to_string(),
    build_dir: build_dir.clone(),
    configuration: BuildConfiguration::Release,
    invocations: vec![Invocation::cmd_script(
      format!("{vsdevcmd} && cmake --build . --target {name} --parallel {jobs}"),
      build_dir,
    )],
  };

  let exe = |name: &str| platform.executable_name(name);
  let dlls = ArtifactRule::Collect {
    kind: ArtifactKind::SharedLibrary,
    dir: build_dir.clone(),
    extension: "dll".to_string(),
    transfer: Transfer::Copy,
  };

  let client = Target {
    build: cmake_build(CLIENT),
    artifacts: vec![
      Artifact::copy(ArtifactKind::Executable, build_dir.join(exe(CLIENT)), exe(CLIENT)).into(),
      dlls.clone(),
      Artifact::copy(ArtifactKind::Executable, tools.git_usr_bin.join("patch.exe"), "patch.exe").into(),
      Artifact::copy(
        ArtifactKind::SharedLibrary,
        tools.git_usr_bin.join("msys-2.0.dll"),
        "msys-2.0.dll",
      )
      .into(),
      Artifact::moved(ArtifactKind::ResourceTree, build_dir.join(RESOURCES_DIR), RESOURCES_DIR).into(),
    ],
  };

  let server = Target {
    build: cmake_build(SERVER),
    artifacts: vec![
      Artifact::copy(ArtifactKind::Executable, build_dir.join(exe(SERVER)), exe(SERVER)).into(),
      dlls,
      Artifact::copy(ArtifactKind::DataFile, build_dir.join("Structures.asset"), "Structures.asset").into(),
      Artifact::copy(ArtifactKind::DataFile, build_dir.join("pixel_font.ttf"), "pixel_font.ttf").into(),
    ],
  };

  PipelineConfig {
    platform,
    dependencies_root: paths.dependencies.clone(),
    dependencies: vec![sfml, zlib],
    configure: vec![configure],
    targets: vec![client, server],
    output: OutputTree::new(platform, &paths.output)
      .with_target(CLIENT, CLIENT)
      .with_target(SERVER, SERVER),
    intermediates: Vec::new(),
    launch: LaunchSpec {
      target: CLIENT.to_string(),
      executable: exe(CLIENT).into(),
    },
  }
}
