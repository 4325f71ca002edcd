//! Hashing utilities for staged trees.
//!
//! This module provides:
//! - `ContentHash`: A full 64-character SHA-256 for content verification
//! - `hash_file()` / `hash_bytes()`: single file and byte hashing
//! - `directory_manifest()`: deterministic per-file digests of a directory
//! - `write_manifest()`: the `dbrecipe-manifest.txt` written after export
//!   and package assembly

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use walkdir::WalkDir;

use crate::consts::MANIFEST_FILE;

/// A full 64-character SHA-256 hash.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Error while hashing a directory tree.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
  #[error("failed to walk directory: {message}")]
  WalkDir { message: String },

  #[error("failed to read file {path}: {message}")]
  ReadFile { path: String, message: String },

  #[error("failed to read symlink {path}: {message}")]
  ReadSymlink { path: String, message: String },

  #[error("failed to write manifest {path}: {message}")]
  WriteManifest { path: String, message: String },
}

/// One line of a digest manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
  /// Path relative to the manifest root, `/`-separated.
  pub path: String,
  /// SHA-256 of the file content, or of the link target for symlinks.
  pub digest: ContentHash,
}

/// Compute per-file digests for every regular file and symlink under `root`.
///
/// Entries are sorted by path and do not include directories, so two trees
/// with the same files produce identical manifests regardless of walk order
/// or timestamps. Names listed in `exclude` are skipped at any depth.
pub fn directory_manifest(root: &Path, exclude: &[&str]) -> Result<Vec<ManifestEntry>, HashError> {
  let mut entries = Vec::new();

  let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|e| {
    e.file_name()
      .to_str()
      .map(|name| !exclude.contains(&name))
      .unwrap_or(true)
  });

  for entry in walker {
    let entry = entry.map_err(|e| HashError::WalkDir { message: e.to_string() })?;
    let entry_path = entry.path();

    let Ok(rel) = entry_path.strip_prefix(root) else {
      continue;
    };
    if rel.as_os_str().is_empty() {
      continue;
    }
    let rel_path = slash_path(rel);

    let file_type = entry.file_type();
    let digest = if file_type.is_symlink() {
      let target = fs::read_link(entry_path).map_err(|e| HashError::ReadSymlink {
        path: entry_path.display().to_string(),
        message: e.to_string(),
      })?;
      hash_bytes(target.to_string_lossy().as_bytes())
    } else if file_type.is_file() {
      hash_file(entry_path)?
    } else {
      continue;
    };

    entries.push(ManifestEntry { path: rel_path, digest });
  }

  entries.sort_by(|a, b| a.path.cmp(&b.path));
  Ok(entries)
}

/// Render manifest entries as `path: digest` lines.
pub fn render_manifest(entries: &[ManifestEntry]) -> String {
  let mut out = String::new();
  for entry in entries {
    out.push_str(&entry.path);
    out.push_str(": ");
    out.push_str(&entry.digest.0);
    out.push('\n');
  }
  out
}

/// Write `dbrecipe-manifest.txt` at the root of `dir`, covering every file
/// beneath it except the manifest itself.
pub fn write_manifest(dir: &Path) -> Result<PathBuf, HashError> {
  let entries = directory_manifest(dir, &[MANIFEST_FILE])?;
  let path = dir.join(MANIFEST_FILE);
  fs::write(&path, render_manifest(&entries)).map_err(|e| HashError::WriteManifest {
    path: path.display().to_string(),
    message: e.to_string(),
  })?;
  debug!(path = ?path, files = entries.len(), "wrote manifest");
  Ok(path)
}

/// Hash a file's contents.
///
/// Returns the full 64-character SHA-256 hash of the file.
pub fn hash_file(path: &Path) -> Result<ContentHash, HashError> {
  let mut file = fs::File::open(path).map_err(|e| HashError::ReadFile {
    path: path.display().to_string(),
    message: e.to_string(),
  })?;

  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(|e| HashError::ReadFile {
      path: path.display().to_string(),
      message: e.to_string(),
    })?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(hex::encode(hasher.finalize()))
}

/// Render a relative path with `/` separators on every platform.
pub fn slash_path(rel: &Path) -> String {
  rel
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}
