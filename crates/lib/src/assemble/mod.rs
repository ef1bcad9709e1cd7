//! Output tree assembly.
//!
//! Each target's output directory is rebuilt from scratch on every run: the
//! old directory is removed, recreated, and filled from the build outputs.
//! Nothing from a previous run survives.

mod types;

use std::fs;
use std::path::Path;

use tracing::{debug, info};

pub use types::*;

use crate::error::{Error, IoResultExt, Result};
use crate::util::fs::{copy_file, copy_tree, move_path, remove_dir_if_exists};

/// Assemble `target` into its directory in `tree`.
pub fn assemble(tree: &OutputTree, target: &str, rules: &[ArtifactRule]) -> Result<Vec<Artifact>> {
  let dest_dir = tree.target_dir(target).ok_or_else(|| {
    Error::io(
      &tree.root,
      std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("no output directory registered for {target}"),
      ),
    )
  })?;
  assemble_into(dest_dir, target, rules)
}

/// Replace `dest_dir` with the artifacts described by `rules`.
///
/// Declared artifacts are checked before anything is deleted, so a missing
/// build output leaves the previous output directory in place.
pub fn assemble_into(dest_dir: &Path, target: &str, rules: &[ArtifactRule]) -> Result<Vec<Artifact>> {
  let artifacts = resolve(target, rules)?;

  if remove_dir_if_exists(dest_dir)? {
    debug!(build_target = %target, dir = ?dest_dir, "removed stale output");
  }
  fs::create_dir_all(dest_dir).at(dest_dir)?;

  for artifact in &artifacts {
    place(artifact, dest_dir)?;
  }

  info!(build_target = %target, dir = ?dest_dir, artifacts = artifacts.len(), "assembled output");
  Ok(artifacts)
}

/// Expand rules into concrete artifacts, failing on the first missing one.
pub fn resolve(target: &str, rules: &[ArtifactRule]) -> Result<Vec<Artifact>> {
  let mut artifacts = Vec::new();

  for rule in rules {
    match rule {
      ArtifactRule::Declared(artifact) => {
        if fs::symlink_metadata(&artifact.source).is_err() {
          return Err(Error::MissingArtifact {
            target: target.to_string(),
            path: artifact.source.clone(),
          });
        }
        artifacts.push(artifact.clone());
      }
      ArtifactRule::Collect {
        kind,
        dir,
        extension,
        transfer,
      } => artifacts.extend(collect(*kind, dir, extension, *transfer)?),
    }
  }

  Ok(artifacts)
}

fn collect(kind: ArtifactKind, dir: &Path, extension: &str, transfer: Transfer) -> Result<Vec<Artifact>> {
  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
    Err(e) => return Err(Error::io(dir, e)),
  };

  let mut matched = Vec::new();
  for entry in entries {
    let path = entry.at(dir)?.path();
    let is_match = path
      .extension()
      .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    if is_match && path.is_file() {
      matched.push(path);
    }
  }
  matched.sort();

  Ok(
    matched
      .into_iter()
      .filter_map(|source| {
        let name = source.file_name()?.to_owned();
        Some(Artifact {
          kind,
          destination: name.into(),
          source,
          transfer,
        })
      })
      .collect(),
  )
}

fn place(artifact: &Artifact, dest_dir: &Path) -> Result<()> {
  let dest = dest_dir.join(&artifact.destination);
  debug!(kind = %artifact.kind, src = ?artifact.source, dst = ?dest, "placing artifact");

  match (artifact.transfer, artifact.kind.is_tree()) {
    (Transfer::Move, _) => move_path(&artifact.source, &dest),
    (Transfer::Copy, true) => copy_tree(&artifact.source, &dest),
    (Transfer::Copy, false) => copy_file(&artifact.source, &dest),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::HostPlatform;
  use tempfile::TempDir;

  fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
  }

  struct Fixture {
    _temp: TempDir,
    build: std::path::PathBuf,
    tree: OutputTree,
  }

  fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let build = temp.path().join("Build");
    write(&build.join("Terralistic"), "client-bin");
    write(&build.join("Terralistic-server"), "server-bin");
    write(&build.join("Resources/textures/blocks/dirt.png"), "dirt");
    write(&build.join("Resources/sounds/click.ogg"), "click");
    write(&build.join("Structures.asset"), "structures");
    let tree = OutputTree::new(HostPlatform::Linux, temp.path().join("Output"))
      .with_target("Terralistic", "Terralistic")
      .with_target("Terralistic-server", "Terralistic-server");
    Fixture {
      _temp: temp,
      build,
      tree,
    }
  }

  fn client_rules(build: &Path) -> Vec<ArtifactRule> {
    vec![
      Artifact::copy(ArtifactKind::Executable, build.join("Terralistic"), "Terralistic").into(),
      Artifact::copy(ArtifactKind::ResourceTree, build.join("Resources"), "Resources").into(),
      Artifact::copy(ArtifactKind::DataFile, build.join("Structures.asset"), "Structures.asset").into(),
    ]
  }

  #[test]
  fn stale_files_do_not_survive() {
    let fx = fixture();
    let dest = fx.tree.target_dir("Terralistic").unwrap().clone();
    write(&dest.join("old.txt"), "stale");

    assemble(&fx.tree, "Terralistic", &client_rules(&fx.build)).unwrap();

    assert!(!dest.join("old.txt").exists());
    assert!(dest.join("Terralistic").is_file());
  }

  #[test]
  fn all_declared_artifacts_are_placed_by_kind() {
    let fx = fixture();
    let placed = assemble(&fx.tree, "Terralistic", &client_rules(&fx.build)).unwrap();
    let dest = fx.tree.target_dir("Terralistic").unwrap();

    assert_eq!(placed.len(), 3);
    assert_eq!(fs::read_to_string(dest.join("Terralistic")).unwrap(), "client-bin");
    assert_eq!(
      fs::read_to_string(dest.join("Resources/textures/blocks/dirt.png")).unwrap(),
      "dirt"
    );
    assert!(dest.join("Resources/sounds/click.ogg").is_file());
    assert!(dest.join("Structures.asset").is_file());
    // copies leave the build outputs reusable
    assert!(fx.build.join("Resources/sounds/click.ogg").is_file());
  }

  #[test]
  fn moved_tree_is_consumed() {
    let fx = fixture();
    let rules: Vec<ArtifactRule> = vec![Artifact::moved(ArtifactKind::ResourceTree, fx.build.join("Resources"), "Resources").into()];

    assemble(&fx.tree, "Terralistic", &rules).unwrap();

    let dest = fx.tree.target_dir("Terralistic").unwrap();
    assert!(dest.join("Resources/textures/blocks/dirt.png").is_file());
    assert!(!fx.build.join("Resources").exists());
  }

  #[test]
  fn shared_bundle_can_be_copied_to_both_targets() {
    let fx = fixture();
    let server_rules: Vec<ArtifactRule> = vec![
      Artifact::copy(ArtifactKind::Executable, fx.build.join("Terralistic-server"), "Terralistic-server").into(),
      Artifact::copy(ArtifactKind::ResourceTree, fx.build.join("Resources"), "Resources").into(),
    ];

    assemble(&fx.tree, "Terralistic", &client_rules(&fx.build)).unwrap();
    assemble(&fx.tree, "Terralistic-server", &server_rules).unwrap();

    for target in ["Terralistic", "Terralistic-server"] {
      assert!(fx.tree.target_dir(target).unwrap().join("Resources/sounds/click.ogg").is_file());
    }
  }

  #[test]
  fn missing_artifact_fails_without_touching_previous_output() {
    let fx = fixture();
    let dest = fx.tree.target_dir("Terralistic").unwrap().clone();
    write(&dest.join("Terralistic"), "previous build");
    let rules: Vec<ArtifactRule> = vec![Artifact::copy(ArtifactKind::Executable, fx.build.join("missing.exe"), "missing.exe").into()];

    let err = assemble(&fx.tree, "Terralistic", &rules).unwrap_err();

    assert!(matches!(err, Error::MissingArtifact { ref target, .. } if target == "Terralistic"));
    assert_eq!(fs::read_to_string(dest.join("Terralistic")).unwrap(), "previous build");
  }

  #[test]
  fn collect_copies_matching_files_flat() {
    let fx = fixture();
    write(&fx.build.join("sfml-graphics-2.dll"), "dll");
    write(&fx.build.join("zlib1.DLL"), "dll");
    write(&fx.build.join("notes.txt"), "txt");
    let rules = vec![ArtifactRule::Collect {
      kind: ArtifactKind::SharedLibrary,
      dir: fx.build.clone(),
      extension: "dll".to_string(),
      transfer: Transfer::Copy,
    }];

    let placed = assemble(&fx.tree, "Terralistic", &rules).unwrap();

    let dest = fx.tree.target_dir("Terralistic").unwrap();
    assert_eq!(placed.len(), 2);
    assert!(dest.join("sfml-graphics-2.dll").is_file());
    assert!(dest.join("zlib1.DLL").is_file());
    assert!(!dest.join("notes.txt").exists());
  }

  #[test]
  fn collect_matching_nothing_is_not_an_error() {
    let fx = fixture();
    let rules = vec![ArtifactRule::Collect {
      kind: ArtifactKind::SharedLibrary,
      dir: fx.build.join("does-not-exist"),
      extension: "dll".to_string(),
      transfer: Transfer::Copy,
    }];

    assert!(assemble(&fx.tree, "Terralistic", &rules).unwrap().is_empty());
  }

  #[test]
  fn unknown_target_is_rejected() {
    let fx = fixture();
    assert!(assemble(&fx.tree, "Terralistic-editor", &[]).is_err());
  }
}
