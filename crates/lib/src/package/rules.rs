use serde::{Deserialize, Serialize};

/// Header suffixes copied with their relative paths intact.
pub const HEADER_SUFFIXES: &[&str] = &["h", "hh", "hpp", "H", "hxx", "hcc"];

/// How files matching one glob land in the package tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRule {
  /// Glob over paths relative to the build root; `*` also matches `/`.
  pub pattern: String,
  /// Destination subdirectory of the package root (empty for the root).
  #[serde(default)]
  pub dst: String,
  /// Drop the source's relative directories.
  #[serde(default)]
  pub flatten: bool,
  /// Copy symlinks as links instead of their targets' contents.
  #[serde(default)]
  pub symlinks: bool,
}

impl ArtifactRule {
  /// Copy matches under `dst`, keeping their relative paths.
  pub fn keep_path(pattern: &str, dst: &str) -> Self {
    Self {
      pattern: pattern.to_string(),
      dst: dst.to_string(),
      flatten: false,
      symlinks: false,
    }
  }

  /// Copy matches directly into `dst`.
  pub fn flat(pattern: &str, dst: &str) -> Self {
    Self {
      flatten: true,
      ..Self::keep_path(pattern, dst)
    }
  }

  pub fn with_symlinks(mut self) -> Self {
    self.symlinks = true;
    self
  }
}

/// Header rules (one per suffix, package root, paths kept) followed by the
/// flattened binary rules.
pub fn default_rules() -> Vec<ArtifactRule> {
  let mut rules: Vec<ArtifactRule> = HEADER_SUFFIXES
    .iter()
    .map(|suffix| ArtifactRule::keep_path(&format!("*.{}", suffix), ""))
    .collect();
  rules.extend([
    ArtifactRule::flat("*.lib", "lib"),
    ArtifactRule::flat("*.dll", "bin"),
    ArtifactRule::flat("*.dylib*", "lib"),
    ArtifactRule::flat("*.so*", "lib").with_symlinks(),
    ArtifactRule::flat("*.a", "lib"),
  ]);
  rules
}
