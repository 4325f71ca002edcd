//! CMake build driver.

use std::collections::BTreeMap;
use std::fs;

use tracing::info;

use crate::build::{BuildError, BuildRequest};
use crate::consts::CMAKE_ENV;
use crate::exec::{run_command, tool_path};

/// Runs a configure step followed by a build step.
pub trait BuildDriver {
  fn configure(&self, request: &BuildRequest) -> Result<(), BuildError>;

  fn build(&self, request: &BuildRequest) -> Result<(), BuildError>;
}

/// Drives `cmake -S .. -B ..` then `cmake --build ..`.
#[derive(Debug, Clone)]
pub struct CmakeDriver {
  cmake: String,
  generator: Option<String>,
}

impl Default for CmakeDriver {
  fn default() -> Self {
    Self::new()
  }
}

impl CmakeDriver {
  /// Use the `cmake` on `PATH`, or `$DBRECIPE_CMAKE` when set.
  pub fn new() -> Self {
    Self {
      cmake: tool_path(CMAKE_ENV, "cmake"),
      generator: None,
    }
  }

  pub fn with_cmake(mut self, cmake: &str) -> Self {
    self.cmake = cmake.to_string();
    self
  }

  pub fn with_generator(mut self, generator: &str) -> Self {
    self.generator = Some(generator.to_string());
    self
  }

  pub fn configure_args(&self, request: &BuildRequest) -> Vec<String> {
    let mut args = vec![
      "-S".to_string(),
      request.layout.source_dir.to_string_lossy().to_string(),
      "-B".to_string(),
      request.layout.build_dir.to_string_lossy().to_string(),
    ];
    if let Some(generator) = &self.generator {
      args.push("-G".to_string());
      args.push(generator.clone());
    }
    for (key, value) in request.all_definitions() {
      args.push(format!("-D{}={}", key, value));
    }
    args
  }

  pub fn build_args(&self, request: &BuildRequest) -> Vec<String> {
    let mut args = vec![
      "--build".to_string(),
      request.layout.build_dir.to_string_lossy().to_string(),
    ];
    // Multi-config generators ignore CMAKE_BUILD_TYPE.
    if let Some(build_type) = &request.build_type {
      args.push("--config".to_string());
      args.push(build_type.clone());
    }
    args
  }
}

impl BuildDriver for CmakeDriver {
  fn configure(&self, request: &BuildRequest) -> Result<(), BuildError> {
    let build_dir = &request.layout.build_dir;
    fs::create_dir_all(build_dir).map_err(|source| BuildError::Io {
      path: build_dir.clone(),
      source,
    })?;
    info!(source = ?request.layout.source_dir, build = ?build_dir, "configuring");
    run_command(&self.cmake, &self.configure_args(request), build_dir, &BTreeMap::new())?;
    Ok(())
  }

  fn build(&self, request: &BuildRequest) -> Result<(), BuildError> {
    info!(build = ?request.layout.build_dir, "building");
    run_command(
      &self.cmake,
      &self.build_args(request),
      &request.layout.build_dir,
      &BTreeMap::new(),
    )?;
    Ok(())
  }
}
