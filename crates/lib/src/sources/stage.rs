//! Copy the canonical file set into an export directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::util::hash::{HashError, write_manifest};

/// Errors while staging sources.
#[derive(Debug, Error)]
pub enum StageError {
  /// A path escapes the checkout (absolute or containing `..`).
  #[error("refusing to stage path outside the checkout: {0}")]
  OutsideCheckout(String),

  /// Copying a file failed.
  #[error("failed to copy {path}: {source}")]
  Copy {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Writing the export manifest failed.
  #[error(transparent)]
  Manifest(#[from] HashError),
}

/// What [`stage_sources`] did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StagedSources {
  /// Paths copied, in canonical order.
  pub staged: Vec<String>,
  /// Paths skipped (blank, deleted, or directories).
  pub skipped: Vec<String>,
  /// Location of the written manifest.
  pub manifest: PathBuf,
}

/// Copy each path of `files` from `checkout` to the same relative location
/// under `export_dir`, then write the export manifest.
///
/// Blank entries, paths missing from the checkout (deleted in the working
/// tree) and directories (submodules) are skipped. Symlinks are copied as
/// links.
pub fn stage_sources(files: &[String], checkout: &Path, export_dir: &Path) -> Result<StagedSources, StageError> {
  info!(files = files.len(), dest = ?export_dir, "staging sources");

  fs::create_dir_all(export_dir).map_err(|source| StageError::Copy {
    path: export_dir.to_path_buf(),
    source,
  })?;

  let mut result = StagedSources::default();

  for file in files {
    let rel = file.trim();
    if rel.is_empty() {
      result.skipped.push(file.clone());
      continue;
    }
    let rel_path = Path::new(rel);
    if rel_path.is_absolute() || rel_path.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
      return Err(StageError::OutsideCheckout(rel.to_string()));
    }

    let src = checkout.join(rel_path);
    let meta = match fs::symlink_metadata(&src) {
      Ok(meta) => meta,
      Err(_) => {
        debug!(path = %rel, "not present in checkout, skipping");
        result.skipped.push(rel.to_string());
        continue;
      }
    };
    if meta.is_dir() {
      debug!(path = %rel, "directory entry, skipping");
      result.skipped.push(rel.to_string());
      continue;
    }

    let dest = export_dir.join(rel_path);
    copy_entry(&src, &dest, meta.file_type().is_symlink())?;
    result.staged.push(rel.to_string());
  }

  result.manifest = write_manifest(export_dir)?;
  info!(
    staged = result.staged.len(),
    skipped = result.skipped.len(),
    "sources staged"
  );
  Ok(result)
}

/// Copy one file or symlink, replacing whatever is at `dest`.
pub(crate) fn copy_entry(src: &Path, dest: &Path, as_link: bool) -> Result<(), StageError> {
  let io_err = |source| StageError::Copy {
    path: src.to_path_buf(),
    source,
  };

  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent).map_err(io_err)?;
  }
  if fs::symlink_metadata(dest).is_ok() {
    fs::remove_file(dest).map_err(io_err)?;
  }

  if as_link {
    let target = fs::read_link(src).map_err(io_err)?;
    make_symlink(&target, dest).map_err(io_err)?;
  } else {
    fs::copy(src, dest).map_err(io_err)?;
  }
  Ok(())
}

#[cfg(unix)]
pub(crate) fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
  std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
pub(crate) fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
  std::os::windows::fs::symlink_file(target, link)
}
