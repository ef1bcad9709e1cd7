//! Archive download and extraction.
//!
//! Dependencies ship as a single pinned archive (or a few archives) at a fixed
//! URL. This module downloads one archive into a scratch file, unpacks it and
//! removes the scratch file again whether or not extraction succeeded.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tar::Archive;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{Error, IoResultExt, Result};

/// Archive container formats understood by [`unpack_archive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
  TarGz,
  Zip,
}

/// One remote archive belonging to a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSource {
  pub url: String,
  pub format: ArchiveFormat,
  /// Lowercase hex SHA256 of the archive, verified when present.
  pub sha256: Option<String>,
}

impl ArchiveSource {
  pub fn new(url: impl Into<String>, format: ArchiveFormat) -> Self {
    Self {
      url: url.into(),
      format,
      sha256: None,
    }
  }

  /// Pin the archive to a checksum.
  pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
    self.sha256 = Some(sha256.into());
    self
  }
}

/// Download `url` to `dest`, verifying the SHA256 if one is given.
pub async fn fetch_archive(url: &str, dest: &Path, expected_sha256: Option<&str>) -> Result<PathBuf> {
  info!(url = %url, "fetching archive");

  if let Some(parent) = dest.parent() {
    tokio::fs::create_dir_all(parent).await.at(parent)?;
  }

  let network = |message: String| Error::Network {
    url: url.to_string(),
    message,
  };

  let response = reqwest::get(url).await.map_err(|e| network(e.to_string()))?;

  if !response.status().is_success() {
    return Err(network(format!("HTTP {}", response.status())));
  }

  let bytes = response.bytes().await.map_err(|e| network(e.to_string()))?;

  if let Some(expected) = expected_sha256 {
    let actual = hex::encode(Sha256::digest(&bytes));
    if actual != expected {
      return Err(Error::HashMismatch {
        url: url.to_string(),
        expected: expected.to_string(),
        actual,
      });
    }
    debug!(sha256 = %expected, "hash verified");
  }

  let mut file = tokio::fs::File::create(dest).await.at(dest)?;
  file.write_all(&bytes).await.at(dest)?;
  file.flush().await.at(dest)?;

  info!(path = ?dest, size = bytes.len(), "download complete");
  Ok(dest.to_path_buf())
}

/// Download `source` into `scratch_dir`, unpack it into `dest` and delete the
/// downloaded file.
pub async fn fetch_and_unpack(source: &ArchiveSource, scratch_dir: &Path, dest: &Path) -> Result<()> {
  let scratch = scratch_dir.join(url_to_filename(&source.url));

  let result = match fetch_archive(&source.url, &scratch, source.sha256.as_deref()).await {
    Ok(path) => {
      let dest = dest.to_path_buf();
      let format = source.format;
      tokio::task::spawn_blocking(move || unpack_archive(&path, &dest, format))
        .await
        .map_err(|e| Error::Archive {
          path: scratch.clone(),
          message: e.to_string(),
        })
        .and_then(|r| r)
    }
    Err(e) => Err(e),
  };

  match tokio::fs::remove_file(&scratch).await {
    Ok(()) => debug!(path = ?scratch, "removed scratch archive"),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
    Err(e) => warn!(path = ?scratch, error = %e, "failed to remove scratch archive"),
  }

  result
}

/// Unpack an archive into `dest`, keeping the archive's own directory layout.
pub fn unpack_archive(archive_path: &Path, dest: &Path, format: ArchiveFormat) -> Result<()> {
  fs::create_dir_all(dest).at(dest)?;

  match format {
    ArchiveFormat::TarGz => unpack_tar_gz(archive_path, dest),
    ArchiveFormat::Zip => unpack_zip(archive_path, dest),
  }
  .map_err(|message| Error::Archive {
    path: archive_path.to_path_buf(),
    message,
  })?;

  info!(archive = ?archive_path, dest = ?dest, "unpacked archive");
  Ok(())
}

fn unpack_tar_gz(archive_path: &Path, dest: &Path) -> std::result::Result<(), String> {
  let file = File::open(archive_path).map_err(|e| e.to_string())?;
  let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));

  for entry in archive.entries().map_err(|e| e.to_string())? {
    let mut entry = entry.map_err(|e| e.to_string())?;
    // unpack_in refuses entries that would escape `dest`
    entry.unpack_in(dest).map_err(|e| e.to_string())?;
  }

  Ok(())
}

fn unpack_zip(archive_path: &Path, dest: &Path) -> std::result::Result<(), String> {
  let file = File::open(archive_path).map_err(|e| e.to_string())?;
  let mut archive =
    zip::ZipArchive::new(BufReader::new(file)).map_err(|e| format!("failed to open zip: {e}"))?;

  for i in 0..archive.len() {
    let mut file = archive
      .by_index(i)
      .map_err(|e| format!("failed to read zip entry: {e}"))?;

    let path = file
      .enclosed_name()
      .ok_or_else(|| format!("invalid zip entry name: {}", file.name()))?;
    let dest_path = dest.join(path);

    if file.is_dir() {
      fs::create_dir_all(&dest_path).map_err(|e| e.to_string())?;
      continue;
    }

    if let Some(parent) = dest_path.parent() {
      fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let mut outfile = File::create(&dest_path).map_err(|e| e.to_string())?;
    std::io::copy(&mut file, &mut outfile).map_err(|e| e.to_string())?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      if let Some(mode) = file.unix_mode() {
        fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode)).map_err(|e| e.to_string())?;
      }
    }
  }

  Ok(())
}

/// Convert a URL to a safe scratch file name.
///
/// Takes the last path component and sanitizes it, falling back to a hash of
/// the URL if nothing usable remains.
fn url_to_filename(url: &str) -> String {
  if let Some(filename) = url.rsplit('/').next() {
    let filename = filename.split('?').next().unwrap_or(filename);

    let sanitized: String = filename
      .chars()
      .map(|c| {
        if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
          c
        } else {
          '_'
        }
      })
      .collect();

    if !sanitized.is_empty() && sanitized != "." && sanitized != ".." {
      return sanitized;
    }
  }

  format!("download_{}", &hex::encode(Sha256::digest(url.as_bytes()))[..16])
}
