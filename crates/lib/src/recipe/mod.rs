//! The recipe interface the host calls back into.
//!
//! A host drives a recipe through four lifecycle points, each independent
//! and stateless apart from the [`ConfigBundle`]:
//!
//! 1. [`Recipe::requirements`] - references to resolve before building
//! 2. [`Recipe::export_sources`] - the canonical file set to stage
//! 3. [`Recipe::build`] - configure and build in host-provided folders
//! 4. [`Recipe::package`] - artifact rules for package assembly
//!
//! [`Recipe::package_info`] reports what an assembled package provides.
//!
//! The recipe decides; the host acts. Staging files and copying artifacts
//! are host work ([`host::LocalHost`]), so a recipe can be exercised with
//! fake collaborators and no filesystem side effects of its own.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::build::{BuildError, BuildLayout, BuildResult};
use crate::options::{ConfigBundle, OptionError};
use crate::package::{ArtifactRule, PackageError, PackageInfo};
use crate::requirements::Requirements;
use crate::resolve::ResolveError;
use crate::sources::{StageError, VcsError};

pub mod engine;
pub mod host;
pub mod lua;
pub mod table;

pub use engine::TableRecipe;
pub use host::{CreateReport, LocalHost};
pub use table::{Metadata, RecipeTable, TableError};

/// Any error raised by a lifecycle call.
#[derive(Debug, Error)]
pub enum RecipeError {
  #[error(transparent)]
  Table(#[from] TableError),

  #[error(transparent)]
  Option(#[from] OptionError),

  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Vcs(#[from] VcsError),

  #[error(transparent)]
  Stage(#[from] StageError),

  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Package(#[from] PackageError),

  /// A lifecycle stage ran before the stage it depends on.
  #[error("{stage} output not found at {path}; run `{stage}` first")]
  MissingStage { stage: &'static str, path: PathBuf },

  /// Reading or writing the host's work directory failed.
  #[error("failed to access {path}: {message}")]
  Io { path: PathBuf, message: String },
}

/// Broad failure class, used by callers to choose an exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Bad options, settings, recipe table or invocation order.
  Configuration,
  /// git or the build driver failed.
  Collaborator,
  /// Filesystem failure.
  Io,
}

impl RecipeError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      RecipeError::Table(TableError::Read { .. }) => ErrorKind::Io,
      RecipeError::Table(_) | RecipeError::Option(_) | RecipeError::Resolve(_) => ErrorKind::Configuration,
      RecipeError::MissingStage { .. } => ErrorKind::Configuration,
      RecipeError::Vcs(_) => ErrorKind::Collaborator,
      RecipeError::Build(BuildError::Driver(_)) => ErrorKind::Collaborator,
      RecipeError::Build(BuildError::Io { .. }) => ErrorKind::Io,
      RecipeError::Stage(StageError::OutsideCheckout(_)) => ErrorKind::Configuration,
      RecipeError::Package(PackageError::InvalidPattern { .. } | PackageError::InvalidDestination(_)) => {
        ErrorKind::Configuration
      }
      RecipeError::Stage(_) | RecipeError::Package(_) | RecipeError::Io { .. } => ErrorKind::Io,
    }
  }
}

/// Decision logic a package host calls into.
pub trait Recipe {
  fn metadata(&self) -> &Metadata;

  /// Dependencies for this configuration, in table order, each at most once.
  fn requirements(&self, config: &ConfigBundle) -> Result<Requirements, RecipeError>;

  /// Paths, relative to the checkout, that make up the exported sources.
  fn export_sources(&self, config: &ConfigBundle) -> Result<Vec<String>, RecipeError>;

  /// Configure then build in `layout`.
  fn build(&self, config: &ConfigBundle, layout: &BuildLayout) -> Result<BuildResult, RecipeError>;

  /// Ordered artifact rules to apply to `build.output_dir`.
  fn package(&self, config: &ConfigBundle, build: &BuildResult) -> Result<Vec<ArtifactRule>, RecipeError>;

  fn package_info(&self, package_dir: &Path) -> Result<PackageInfo, RecipeError>;
}
