//! Positional single-line header patches.

use std::fs;
use std::path::Path;

use tracing::info;

use super::types::PatchSpec;
use crate::error::{Error, IoResultExt, Result};

/// Apply `spec` to the file it names under `root`.
///
/// Lines are split after each `\n` and keep their terminators, so every line
/// other than `spec.line_index` is written back byte for byte.
pub fn apply_patch(spec: &PatchSpec, root: &Path) -> Result<()> {
  let path = root.join(&spec.target_file);
  let contents = fs::read(&path).at(&path)?;

  let mut lines: Vec<&[u8]> = contents.split_inclusive(|b| *b == b'\n').collect();
  let line_count = lines.len();

  let Some(line) = lines.get_mut(spec.line_index) else {
    return Err(Error::PatchOutOfRange {
      path,
      line_index: spec.line_index,
      line_count,
    });
  };
  *line = spec.replacement_line.as_bytes();

  fs::write(&path, lines.concat()).at(&path)?;

  info!(path = ?path, line = spec.line_index, "patched header");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn fixture(dir: &Path) -> Vec<String> {
    let lines: Vec<String> = (0..10).map(|i| format!("#define LINE_{i} {i}\n")).collect();
    fs::write(dir.join("zconf.h"), lines.concat()).unwrap();
    lines
  }

  fn spec(line_index: usize) -> PatchSpec {
    PatchSpec {
      target_file: "zconf.h".into(),
      line_index,
      replacement_line: "#if 0\n".to_string(),
    }
  }

  #[test]
  fn replaces_only_the_addressed_line() {
    let temp = TempDir::new().unwrap();
    let original = fixture(temp.path());

    apply_patch(&spec(3), temp.path()).unwrap();

    let patched = fs::read_to_string(temp.path().join("zconf.h")).unwrap();
    let patched: Vec<&str> = patched.split_inclusive('\n').collect();
    assert_eq!(patched.len(), 10);
    for (i, line) in patched.iter().enumerate() {
      if i == 3 {
        assert_eq!(*line, "#if 0\n");
      } else {
        assert_eq!(*line, original[i]);
      }
    }
  }

  #[test]
  fn keeps_crlf_and_missing_final_newline() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("zconf.h"), "a\r\nb\r\nc").unwrap();

    apply_patch(&spec(1), temp.path()).unwrap();

    assert_eq!(fs::read_to_string(temp.path().join("zconf.h")).unwrap(), "a\r\n#if 0\nc");
  }

  #[test]
  fn out_of_range_index_is_rejected() {
    let temp = TempDir::new().unwrap();
    fixture(temp.path());

    let err = apply_patch(&spec(10), temp.path()).unwrap_err();
    assert!(matches!(
      err,
      Error::PatchOutOfRange {
        line_index: 10,
        line_count: 10,
        ..
      }
    ));
  }

  #[test]
  fn missing_file_is_an_io_error() {
    let temp = TempDir::new().unwrap();
    let err = apply_patch(&spec(0), temp.path()).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
  }
}
