//! Cache-with-presence-marker provisioning.

use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path};

use tracing::{debug, info};

use super::patch::apply_patch;
use super::types::{Dependency, Provisioned};
use crate::error::{Error, IoResultExt, Result};
use crate::fetch::fetch_and_unpack;
use crate::util::fs::remove_path;

/// Returns true when `dependency` is already provisioned under `root`.
pub fn is_provisioned(dependency: &Dependency, root: &Path) -> bool {
  root.join(&dependency.marker).is_dir()
}

/// Make sure `dependency` is present under `root`.
///
/// When the marker directory exists this returns immediately without touching
/// the network. Otherwise every archive is downloaded and extracted into a
/// staging directory inside `root`, the dependency's patch is applied there,
/// and the staged entries are renamed into `root`. A failure at any point
/// drops the staging directory, so the marker only ever appears complete.
pub async fn ensure(dependency: &Dependency, root: &Path) -> Result<Provisioned> {
  if is_provisioned(dependency, root) {
    debug!(dependency = %dependency.name, marker = ?dependency.marker, "dependency cached");
    return Ok(Provisioned::Cached);
  }

  info!(dependency = %dependency.name, "provisioning dependency");
  fs::create_dir_all(root).at(root)?;

  let staging = tempfile::Builder::new()
    .prefix(".staging-")
    .tempdir_in(root)
    .at(root)?;
  let extract_dir = staging.path().join(&dependency.extract_subdir);

  for archive in &dependency.archives {
    fetch_and_unpack(archive, root, &extract_dir).await?;
  }

  if let Some(patch) = &dependency.patch {
    apply_patch(patch, staging.path())?;
  }

  promote(staging.path(), root, &dependency.marker)?;

  if !is_provisioned(dependency, root) {
    return Err(Error::Archive {
      path: root.join(&dependency.marker),
      message: "archive did not produce the expected directory".to_string(),
    });
  }

  info!(dependency = %dependency.name, "dependency provisioned");
  Ok(Provisioned::Fetched)
}

/// Rename every top-level entry of `staging` into `root`, replacing leftovers
/// from an earlier interrupted run.
///
/// The entry holding `marker` is renamed last, so a failure part way through
/// never leaves the marker next to missing content.
fn promote(staging: &Path, root: &Path, marker: &Path) -> Result<()> {
  let mut names = Vec::new();
  for entry in fs::read_dir(staging).at(staging)? {
    names.push(entry.at(staging)?.file_name());
  }

  for name in promotion_order(names, marker) {
    let target = root.join(&name);

    if target.symlink_metadata().is_ok() {
      debug!(path = ?target, "replacing stale entry");
      remove_path(&target)?;
    }

    fs::rename(staging.join(&name), &target).at(&target)?;
  }
  Ok(())
}

fn promotion_order(mut names: Vec<OsString>, marker: &Path) -> Vec<OsString> {
  let head = match marker.components().next() {
    Some(Component::Normal(head)) => Some(head.to_owned()),
    _ => None,
  };
  names.sort();
  // stable: everything else keeps its order ahead of the marker entry
  names.sort_by_key(|name| head.as_ref() == Some(name));
  names
}
