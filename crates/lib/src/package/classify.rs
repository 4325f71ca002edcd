//! Apply artifact rules to a build tree.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::package::{ArtifactRule, PackageError};
use crate::sources::stage::make_symlink;
use crate::util::hash::{slash_path, write_manifest};

/// Case-sensitive, and `*` crosses directory separators.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: false,
  require_literal_leading_dot: false,
};

/// One file placed into the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedArtifact {
  /// Pattern of the rule that matched.
  pub pattern: String,
  /// Path relative to the build root.
  pub source: String,
  /// Path relative to the package root.
  pub dest: String,
  /// Link target when copied as a symlink.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub link: Option<String>,
}

/// What [`assemble_package`] did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PackageReport {
  pub copied: Vec<CopiedArtifact>,
  pub manifest: PathBuf,
}

struct Candidate {
  rel: String,
  abs: PathBuf,
  is_symlink: bool,
}

/// Copy every file under `build_dir` matched by `rules` into `package_dir`.
///
/// Rules apply in order; a later rule overwrites an earlier copy of the same
/// destination. A rule matching nothing is not an error. All patterns and
/// destinations are validated before anything is copied.
pub fn assemble_package(rules: &[ArtifactRule], build_dir: &Path, package_dir: &Path) -> Result<PackageReport, PackageError> {
  let compiled = compile_rules(rules)?;
  let candidates = collect_candidates(build_dir, package_dir)?;
  info!(
    rules = rules.len(),
    candidates = candidates.len(),
    package = ?package_dir,
    "assembling package"
  );

  fs::create_dir_all(package_dir).map_err(|source| PackageError::Copy {
    path: package_dir.to_path_buf(),
    source,
  })?;

  let mut report = PackageReport::default();

  for (rule, pattern) in rules.iter().zip(&compiled) {
    let matched: Vec<&Candidate> = candidates
      .iter()
      .filter(|c| pattern.matches_with(&c.rel, MATCH_OPTIONS))
      .collect();
    if matched.is_empty() {
      debug!(pattern = %rule.pattern, "rule matched nothing");
      continue;
    }
    let matched_rels: HashSet<&str> = matched.iter().map(|c| c.rel.as_str()).collect();

    for candidate in matched {
      if candidate.is_symlink && !rule.symlinks && fs::metadata(&candidate.abs).is_err() {
        debug!(link = %candidate.rel, "dangling symlink, skipping");
        continue;
      }

      let dest_rel = destination(rule, &candidate.rel);
      let dest = package_dir.join(&dest_rel);

      let link = if rule.symlinks && candidate.is_symlink {
        relink_target(candidate, build_dir, rule, &matched_rels)?
      } else {
        None
      };

      place(&candidate.abs, &dest, link.as_deref())?;
      debug!(source = %candidate.rel, dest = %dest_rel, link = ?link, "copied artifact");

      report.copied.push(CopiedArtifact {
        pattern: rule.pattern.clone(),
        source: candidate.rel.clone(),
        dest: dest_rel,
        link: link.map(|l| slash_path(&l)),
      });
    }
  }

  report.manifest = write_manifest(package_dir)?;
  info!(files = report.copied.len(), "package assembled");
  Ok(report)
}

fn compile_rules(rules: &[ArtifactRule]) -> Result<Vec<Pattern>, PackageError> {
  rules
    .iter()
    .map(|rule| {
      let dst = Path::new(&rule.dst);
      if dst.is_absolute() || dst.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(PackageError::InvalidDestination(rule.dst.clone()));
      }
      Pattern::new(&rule.pattern).map_err(|e| PackageError::InvalidPattern {
        pattern: rule.pattern.clone(),
        message: e.to_string(),
      })
    })
    .collect()
}

/// Regular files and symlinks to files under `build_dir`, sorted by path.
fn collect_candidates(build_dir: &Path, package_dir: &Path) -> Result<Vec<Candidate>, PackageError> {
  let package_canonical = dunce::canonicalize(package_dir).ok();

  let walker = WalkDir::new(build_dir).sort_by_file_name().into_iter().filter_entry(|e| {
    if !e.file_type().is_dir() {
      return true;
    }
    if e.path() == package_dir {
      return false;
    }
    match &package_canonical {
      Some(pkg) => dunce::canonicalize(e.path()).map(|p| &p != pkg).unwrap_or(true),
      None => true,
    }
  });

  let mut candidates = Vec::new();
  for entry in walker {
    let entry = entry.map_err(|e| PackageError::Walk { message: e.to_string() })?;
    let file_type = entry.file_type();
    let is_symlink = file_type.is_symlink();

    if file_type.is_dir() {
      continue;
    }
    if is_symlink && entry.path().is_dir() {
      debug!(path = ?entry.path(), "symlink to directory, skipping");
      continue;
    }
    if !is_symlink && !file_type.is_file() {
      continue;
    }

    let Ok(rel) = entry.path().strip_prefix(build_dir) else {
      continue;
    };
    candidates.push(Candidate {
      rel: slash_path(rel),
      abs: entry.path().to_path_buf(),
      is_symlink,
    });
  }
  Ok(candidates)
}

fn destination(rule: &ArtifactRule, rel: &str) -> String {
  let tail = if rule.flatten {
    rel.rsplit('/').next().unwrap_or(rel)
  } else {
    rel
  };
  let dst = rule.dst.trim_matches('/');
  if dst.is_empty() {
    tail.to_string()
  } else {
    format!("{}/{}", dst, tail)
  }
}

/// Work out the link target for a copied symlink so it resolves inside the
/// package. Returns `None` when the target is not part of this rule's
/// matches; the link is then copied as its target's contents. A link whose
/// target does not exist is recreated as is.
fn relink_target(
  candidate: &Candidate,
  build_dir: &Path,
  rule: &ArtifactRule,
  matched: &HashSet<&str>,
) -> Result<Option<PathBuf>, PackageError> {
  let raw = fs::read_link(&candidate.abs).map_err(|source| PackageError::Copy {
    path: candidate.abs.clone(),
    source,
  })?;

  if fs::metadata(&candidate.abs).is_err() {
    debug!(link = %candidate.rel, target = ?raw, "dangling symlink, keeping target");
    let verbatim = match raw.file_name() {
      Some(name) if rule.flatten => PathBuf::from(name),
      _ => raw.clone(),
    };
    return Ok(Some(verbatim));
  }

  let link_dir = Path::new(&candidate.rel).parent().unwrap_or(Path::new("")).to_path_buf();

  let resolved = if raw.is_absolute() {
    let root = dunce::canonicalize(build_dir).unwrap_or_else(|_| build_dir.to_path_buf());
    match raw.strip_prefix(&root).or_else(|_| raw.strip_prefix(build_dir)) {
      Ok(inside) => normalize(inside),
      Err(_) => None,
    }
  } else {
    normalize(&link_dir.join(&raw))
  };

  let Some(resolved) = resolved else {
    debug!(link = %candidate.rel, target = ?raw, "link target outside build tree");
    return Ok(None);
  };
  let resolved_rel = slash_path(&resolved);
  if !matched.contains(resolved_rel.as_str()) {
    debug!(link = %candidate.rel, target = %resolved_rel, "link target not packaged, copying contents");
    return Ok(None);
  }

  if rule.flatten {
    Ok(resolved.file_name().map(PathBuf::from))
  } else {
    Ok(Some(relative_path(&link_dir, &resolved)))
  }
}

fn place(src: &Path, dest: &Path, link: Option<&Path>) -> Result<(), PackageError> {
  let io_err = |source| PackageError::Copy {
    path: src.to_path_buf(),
    source,
  };

  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent).map_err(io_err)?;
  }
  if fs::symlink_metadata(dest).is_ok() {
    fs::remove_file(dest).map_err(io_err)?;
  }
  match link {
    Some(target) => make_symlink(target, dest).map_err(io_err)?,
    None => {
      fs::copy(src, dest).map_err(io_err)?;
    }
  }
  Ok(())
}

/// Lexically resolve `.` and `..` in a relative path. `None` if it climbs
/// above its root.
fn normalize(path: &Path) -> Option<PathBuf> {
  let mut out: Vec<&std::ffi::OsStr> = Vec::new();
  for component in path.components() {
    match component {
      Component::Normal(part) => out.push(part),
      Component::CurDir => {}
      Component::ParentDir => {
        out.pop()?;
      }
      Component::RootDir | Component::Prefix(_) => return None,
    }
  }
  Some(out.iter().collect())
}

/// Relative path from directory `from_dir` to `to`, both relative to the
/// same root.
///
/// Example: `relative_path("a/b", "a/c/d")` returns `"../c/d"`.
fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
  let from: Vec<_> = from_dir.components().collect();
  let to_parts: Vec<_> = to.components().collect();
  let common = from.iter().zip(&to_parts).take_while(|(a, b)| a == b).count();

  let mut result = PathBuf::new();
  for _ in common..from.len() {
    result.push("..");
  }
  for part in &to_parts[common..] {
    result.push(part.as_os_str());
  }
  result
}
