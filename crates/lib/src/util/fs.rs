//! Filesystem helpers that attach paths to their errors.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result};

/// Remove a directory tree if it exists.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
  match fs::remove_dir_all(path) {
    Ok(()) => {
      debug!(path = ?path, "removed directory");
      Ok(true)
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(e) => Err(Error::io(path, e)),
  }
}

/// Remove a file, directory or symlink, whichever `path` is.
pub fn remove_path(path: &Path) -> Result<()> {
  let metadata = fs::symlink_metadata(path).at(path)?;
  if metadata.is_dir() {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  }
  .at(path)
}

/// Copy a single file, creating the destination's parent directories.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
  if let Some(parent) = dst.parent() {
    fs::create_dir_all(parent).at(parent)?;
  }
  fs::copy(src, dst).at(src)?;
  Ok(())
}

/// Copy a directory recursively, preserving its structure under `dst`.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
  fs::create_dir_all(dst).at(dst)?;

  for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
    let entry = entry.map_err(|e| {
      let path = e.path().unwrap_or(src).to_path_buf();
      Error::io(path, e.into())
    })?;
    let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
    let target = dst.join(rel);

    let file_type = entry.file_type();
    if file_type.is_dir() {
      fs::create_dir_all(&target).at(&target)?;
    } else if file_type.is_symlink() {
      copy_symlink(entry.path(), &target)?;
    } else {
      fs::copy(entry.path(), &target).at(entry.path())?;
    }
  }

  Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
  let link = fs::read_link(src).at(src)?;
  std::os::unix::fs::symlink(link, dst).at(dst)
}

#[cfg(windows)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
  // Windows symlinks need privileges; copy what they point to.
  if src.is_dir() {
    copy_tree(src, dst)
  } else {
    fs::copy(src, dst).at(src).map(|_| ())
  }
}

/// Move a file or directory to `dst`.
///
/// `dst` must not exist unless it is an empty directory, which is replaced.
/// Falls back to copy-then-delete when a rename is not possible (e.g. across
/// filesystems).
pub fn move_path(src: &Path, dst: &Path) -> Result<()> {
  if dst.is_dir() && fs::read_dir(dst).at(dst)?.next().is_none() {
    fs::remove_dir(dst).at(dst)?;
  }
  if let Some(parent) = dst.parent() {
    fs::create_dir_all(parent).at(parent)?;
  }

  match fs::rename(src, dst) {
    Ok(()) => Ok(()),
    Err(e) => {
      debug!(src = ?src, dst = ?dst, error = %e, "rename failed, copying instead");
      if src.is_dir() {
        copy_tree(src, dst)?;
      } else {
        fs::copy(src, dst).at(src)?;
      }
      remove_path(src)
    }
  }
}
