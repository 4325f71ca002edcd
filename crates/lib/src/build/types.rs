use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFINITION_OFF, DEFINITION_ON};
use crate::exec::ExecError;
use crate::resolve::BuildDefinitions;

/// Errors from the build driver.
#[derive(Debug, Error)]
pub enum BuildError {
  /// Configure or build exited unsuccessfully, or could not start.
  #[error("build driver failed: {0}")]
  Driver(#[from] ExecError),

  /// Preparing the build directory failed.
  #[error("failed to prepare {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Host-provided folders for one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLayout {
  /// Root of the staged sources (contains the top-level `CMakeLists.txt`).
  pub source_dir: PathBuf,
  /// Where the driver writes its build tree.
  pub build_dir: PathBuf,
}

impl BuildLayout {
  pub fn new(source_dir: &Path, build_dir: &Path) -> Self {
    Self {
      source_dir: source_dir.to_path_buf(),
      build_dir: build_dir.to_path_buf(),
    }
  }
}

/// Everything the build driver needs for a configure-then-build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
  pub layout: BuildLayout,
  /// Feature definitions from option resolution.
  pub definitions: BuildDefinitions,
  /// Link mode from the `shared` option, when the recipe declares one.
  pub shared: Option<bool>,
  /// The `build_type` setting.
  pub build_type: Option<String>,
  pub verbose: bool,
}

impl BuildRequest {
  /// Feature definitions plus the toolchain switches derived from link
  /// mode, build type and verbosity. Feature definitions win on key clashes.
  pub fn all_definitions(&self) -> BuildDefinitions {
    let mut all = BuildDefinitions::new();
    if let Some(shared) = self.shared {
      let value = if shared { DEFINITION_ON } else { DEFINITION_OFF };
      all.insert("BUILD_SHARED_LIBS".to_string(), value.to_string());
    }
    if let Some(build_type) = &self.build_type {
      all.insert("CMAKE_BUILD_TYPE".to_string(), build_type.clone());
    }
    if self.verbose {
      all.insert("CMAKE_VERBOSE_MAKEFILE".to_string(), DEFINITION_ON.to_string());
    }
    all.extend(self.definitions.iter().map(|(k, v)| (k.clone(), v.clone())));
    all
  }
}

/// Outcome of a completed build, passed on to packaging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
  /// Tree the artifact rules are applied to.
  pub output_dir: PathBuf,
  /// Every definition handed to the driver.
  pub definitions: BuildDefinitions,
}
