use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::package::PackageError;

/// Consumer-facing view of an assembled package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
  /// Link names, sorted and unique.
  pub libs: Vec<String>,
  pub include_dirs: Vec<String>,
  pub lib_dirs: Vec<String>,
  pub bin_dirs: Vec<String>,
}

impl PackageInfo {
  pub fn from_package(package_dir: &Path) -> Result<Self, PackageError> {
    Ok(Self {
      libs: collect_libs(package_dir)?,
      include_dirs: vec!["include".to_string()],
      lib_dirs: vec!["lib".to_string()],
      bin_dirs: vec!["bin".to_string()],
    })
  }
}

/// Library names found directly in `package_dir/lib`.
///
/// `libfoo.so`, `libfoo.a` and `libfoo.dylib` give `foo`; `foo.lib` gives
/// `foo`. Versioned names like `libfoo.so.1` are ignored. A missing `lib`
/// directory yields an empty list.
pub fn collect_libs(package_dir: &Path) -> Result<Vec<String>, PackageError> {
  let lib_dir = package_dir.join("lib");
  let entries = match fs::read_dir(&lib_dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
    Err(source) => return Err(PackageError::Copy { path: lib_dir, source }),
  };

  let mut libs = BTreeSet::new();
  for entry in entries {
    let entry = entry.map_err(|source| PackageError::Copy {
      path: lib_dir.clone(),
      source,
    })?;
    if entry.path().is_dir() {
      continue;
    }
    let file_name = entry.file_name();
    if let Some(name) = library_name(&file_name.to_string_lossy()) {
      libs.insert(name);
    }
  }
  Ok(libs.into_iter().collect())
}

fn library_name(file_name: &str) -> Option<String> {
  let (stem, ext) = file_name.rsplit_once('.')?;
  let name = match ext {
    "so" | "a" | "dylib" => stem.strip_prefix("lib").unwrap_or(stem),
    "lib" => stem,
    _ => return None,
  };
  if name.is_empty() {
    None
  } else {
    Some(name.to_string())
  }
}
