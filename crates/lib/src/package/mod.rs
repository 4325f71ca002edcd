//! Package assembly.
//!
//! An ordered list of [`ArtifactRule`]s maps files of a completed build tree
//! into the package layout: headers keep their relative paths, libraries
//! are flattened into `lib/` or `bin/`. Shared-object symlink chains are
//! copied as links and retargeted so they resolve inside the package.
//!
//! # Submodules
//!
//! - [`rules`] - artifact rule type and the default rule list
//! - [`classify`] - walks the build tree and copies matches
//! - [`info`] - library discovery in an assembled package

use std::path::PathBuf;

use thiserror::Error;

use crate::util::hash::HashError;

pub mod classify;
pub mod info;
pub mod rules;

pub use classify::{CopiedArtifact, PackageReport, assemble_package};
pub use info::{PackageInfo, collect_libs};
pub use rules::{ArtifactRule, HEADER_SUFFIXES, default_rules};

/// Errors from package assembly.
#[derive(Debug, Error)]
pub enum PackageError {
  #[error("invalid artifact pattern '{pattern}': {message}")]
  InvalidPattern { pattern: String, message: String },

  /// Destination is absolute or climbs out of the package root.
  #[error("artifact destination must stay inside the package: {0}")]
  InvalidDestination(String),

  #[error("failed to walk build tree: {message}")]
  Walk { message: String },

  #[error("failed to copy {path}: {source}")]
  Copy {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Manifest(#[from] HashError),
}
