//! A minimal local host.
//!
//! Plays the package manager's part for a single checkout: stages exported
//! sources, hands the recipe its build folder, and assembles the package
//! from the recipe's artifact rules. Everything lives under one work root:
//!
//! ```text
//! <out>/
//!   export/        staged sources + dbrecipe-manifest.txt
//!   build/         in-source build tree (copy of export/)
//!   build.json     the last BuildResult
//!   package/       assembled package + dbrecipe-manifest.txt
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::build::{BuildLayout, BuildResult};
use crate::consts::MANIFEST_FILE;
use crate::options::ConfigBundle;
use crate::package::{PackageInfo, PackageReport, assemble_package};
use crate::recipe::{Recipe, RecipeError};
use crate::requirements::Requirements;
use crate::sources::stage::copy_entry;
use crate::sources::{StageError, StagedSources, stage_sources};

const BUILD_RESULT_FILE: &str = "build.json";

/// Results of every stage of [`LocalHost::create`].
#[derive(Debug, Clone, Serialize)]
pub struct CreateReport {
  pub requirements: Requirements,
  pub export: StagedSources,
  pub build: BuildResult,
  pub package: PackageReport,
  pub info: PackageInfo,
}

/// Drives a recipe against a local checkout and work root.
#[derive(Debug, Clone)]
pub struct LocalHost {
  checkout: PathBuf,
  out_root: PathBuf,
}

impl LocalHost {
  pub fn new(checkout: &Path, out_root: &Path) -> Self {
    Self {
      checkout: checkout.to_path_buf(),
      out_root: out_root.to_path_buf(),
    }
  }

  pub fn checkout(&self) -> &Path {
    &self.checkout
  }

  pub fn export_dir(&self) -> PathBuf {
    self.out_root.join("export")
  }

  pub fn build_dir(&self) -> PathBuf {
    self.out_root.join("build")
  }

  pub fn package_dir(&self) -> PathBuf {
    self.out_root.join("package")
  }

  fn build_result_path(&self) -> PathBuf {
    self.out_root.join(BUILD_RESULT_FILE)
  }

  /// Stage the recipe's export file set into a fresh `export/`.
  pub fn export(&self, recipe: &dyn Recipe, config: &ConfigBundle) -> Result<StagedSources, RecipeError> {
    let files = recipe.export_sources(config)?;
    let export_dir = self.export_dir();
    reset_dir(&export_dir)?;
    Ok(stage_sources(&files, &self.checkout, &export_dir)?)
  }

  /// Copy `export/` into a fresh `build/` and run the recipe's build there.
  pub fn build(&self, recipe: &dyn Recipe, config: &ConfigBundle) -> Result<BuildResult, RecipeError> {
    let export_dir = self.export_dir();
    if !export_dir.is_dir() {
      return Err(RecipeError::MissingStage {
        stage: "export",
        path: export_dir,
      });
    }

    let build_dir = self.build_dir();
    reset_dir(&build_dir)?;
    copy_tree(&export_dir, &build_dir)?;

    let layout = BuildLayout::new(&build_dir, &build_dir);
    let result = recipe.build(config, &layout)?;

    let path = self.build_result_path();
    let json = serde_json::to_string_pretty(&result).map_err(|e| io_error(&path, e))?;
    fs::write(&path, json).map_err(|e| io_error(&path, e))?;
    debug!(path = ?path, "recorded build result");
    Ok(result)
  }

  /// The result recorded by the last [`LocalHost::build`].
  pub fn last_build(&self) -> Result<BuildResult, RecipeError> {
    let path = self.build_result_path();
    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(RecipeError::MissingStage { stage: "build", path });
      }
      Err(e) => return Err(io_error(&path, e)),
    };
    serde_json::from_str(&content).map_err(|e| io_error(&path, e))
  }

  /// Assemble a fresh `package/` from `build` using the recipe's rules.
  pub fn package(
    &self,
    recipe: &dyn Recipe,
    config: &ConfigBundle,
    build: &BuildResult,
  ) -> Result<PackageReport, RecipeError> {
    let rules = recipe.package(config, build)?;
    let package_dir = self.package_dir();
    reset_dir(&package_dir)?;
    Ok(assemble_package(&rules, &build.output_dir, &package_dir)?)
  }

  pub fn info(&self, recipe: &dyn Recipe) -> Result<PackageInfo, RecipeError> {
    let package_dir = self.package_dir();
    if !package_dir.is_dir() {
      return Err(RecipeError::MissingStage {
        stage: "package",
        path: package_dir,
      });
    }
    recipe.package_info(&package_dir)
  }

  /// Run every stage in order: requirements, export, build, package, info.
  pub fn create(&self, recipe: &dyn Recipe, config: &ConfigBundle) -> Result<CreateReport, RecipeError> {
    info!(recipe = %recipe.metadata().name, out = ?self.out_root, "creating package");
    let requirements = recipe.requirements(config)?;
    let export = self.export(recipe, config)?;
    let build = self.build(recipe, config)?;
    let package = self.package(recipe, config, &build)?;
    let info = self.info(recipe)?;
    Ok(CreateReport {
      requirements,
      export,
      build,
      package,
      info,
    })
  }
}

fn io_error(path: &Path, e: impl std::fmt::Display) -> RecipeError {
  RecipeError::Io {
    path: path.to_path_buf(),
    message: e.to_string(),
  }
}

fn reset_dir(dir: &Path) -> Result<(), RecipeError> {
  if fs::symlink_metadata(dir).is_ok() {
    fs::remove_dir_all(dir).map_err(|e| io_error(dir, e))?;
  }
  fs::create_dir_all(dir).map_err(|e| io_error(dir, e))
}

/// Copy every file and symlink under `src` (except its manifest) to the same
/// relative path under `dest`.
fn copy_tree(src: &Path, dest: &Path) -> Result<(), RecipeError> {
  fs::create_dir_all(dest).map_err(|e| io_error(dest, e))?;
  for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
    let entry = entry.map_err(|e| io_error(src, e))?;
    if entry.file_type().is_dir() {
      continue;
    }
    let Ok(rel) = entry.path().strip_prefix(src) else {
      continue;
    };
    if rel == Path::new(MANIFEST_FILE) {
      continue;
    }
    copy_entry(entry.path(), &dest.join(rel), entry.file_type().is_symlink()).map_err(|e| match e {
      StageError::Copy { path, source } => io_error(&path, source),
      other => RecipeError::Stage(other),
    })?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::build::{BuildDriver, BuildError, BuildRequest};
  use crate::recipe::{RecipeTable, TableRecipe};
  use crate::sources::{VcsError, VcsLister};
  use crate::util::testutil::write_file;
  use tempfile::TempDir;

  struct CannedLister;

  impl VcsLister for CannedLister {
    fn modified_files(&self) -> Result<String, VcsError> {
      Ok(String::new())
    }

    fn tree_files(&self) -> Result<String, VcsError> {
      Ok("CMakeLists.txt\ninclude/dbc++/db.hpp\nsrc/db.cpp\n".to_string())
    }
  }

  /// Produces a static library in the build tree instead of compiling.
  struct FakeDriver;

  impl BuildDriver for FakeDriver {
    fn configure(&self, _request: &BuildRequest) -> Result<(), BuildError> {
      Ok(())
    }

    fn build(&self, request: &BuildRequest) -> Result<(), BuildError> {
      let lib = request.layout.build_dir.join("src/libdbcpp.a");
      fs::create_dir_all(lib.parent().unwrap()).unwrap();
      fs::write(lib, "archive").unwrap();
      Ok(())
    }
  }

  /// Writes a shared or static library depending on the requested link mode.
  struct LinkModeDriver;

  impl BuildDriver for LinkModeDriver {
    fn configure(&self, _request: &BuildRequest) -> Result<(), BuildError> {
      Ok(())
    }

    fn build(&self, request: &BuildRequest) -> Result<(), BuildError> {
      let name = if request.shared == Some(true) { "libdbcpp.so" } else { "libdbcpp.a" };
      write_file(&request.layout.build_dir, &format!("lib/{}", name), "binary");
      Ok(())
    }
  }

  fn checkout() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "CMakeLists.txt", "project(dbcpp)");
    write_file(temp.path(), "include/dbc++/db.hpp", "#pragma once");
    write_file(temp.path(), "src/db.cpp", "int x;");
    write_file(temp.path(), "notes.txt", "untracked");
    temp
  }

  fn recipe() -> TableRecipe {
    TableRecipe::new(RecipeTable::dbcpp(), Box::new(CannedLister), Box::new(FakeDriver)).unwrap()
  }

  #[test]
  fn create_runs_every_stage() {
    let src = checkout();
    let out = TempDir::new().unwrap();
    let host = LocalHost::new(src.path(), out.path());
    let recipe = recipe();
    let config = recipe.configure(&[], &[]).unwrap();

    let report = host.create(&recipe, &config).unwrap();

    assert_eq!(report.requirements.len(), 5);
    assert_eq!(report.export.staged.len(), 3);
    assert!(!host.export_dir().join("notes.txt").exists());
    assert!(host.package_dir().join("include/dbc++/db.hpp").is_file());
    assert!(host.package_dir().join("lib/libdbcpp.a").is_file());
    assert_eq!(report.info.libs, vec!["dbcpp"]);
  }

  #[test]
  fn build_before_export_is_rejected() {
    let src = checkout();
    let out = TempDir::new().unwrap();
    let host = LocalHost::new(src.path(), out.path());
    let recipe = recipe();
    let config = recipe.configure(&[], &[]).unwrap();

    let err = host.build(&recipe, &config).unwrap_err();

    assert!(matches!(err, RecipeError::MissingStage { stage: "export", .. }));
  }

  #[test]
  fn last_build_round_trips_through_work_root() {
    let src = checkout();
    let out = TempDir::new().unwrap();
    let host = LocalHost::new(src.path(), out.path());
    let recipe = recipe();
    let config = recipe.configure(&[("with_pq".to_string(), "False".to_string())], &[]).unwrap();

    assert!(matches!(host.last_build(), Err(RecipeError::MissingStage { stage: "build", .. })));

    host.export(&recipe, &config).unwrap();
    let built = host.build(&recipe, &config).unwrap();

    assert_eq!(host.last_build().unwrap(), built);
  }

  #[test]
  fn export_replaces_stale_files() {
    let src = checkout();
    let out = TempDir::new().unwrap();
    let host = LocalHost::new(src.path(), out.path());
    let recipe = recipe();
    let config = recipe.configure(&[], &[]).unwrap();
    write_file(&host.export_dir(), "stale.cpp", "old");

    host.export(&recipe, &config).unwrap();

    assert!(!host.export_dir().join("stale.cpp").exists());
    assert!(host.export_dir().join("src/db.cpp").exists());
  }

  #[test]
  fn rebuild_does_not_package_previous_artifacts() {
    let src = checkout();
    let out = TempDir::new().unwrap();
    let host = LocalHost::new(src.path(), out.path());
    let recipe = TableRecipe::new(RecipeTable::dbcpp(), Box::new(CannedLister), Box::new(LinkModeDriver)).unwrap();

    let shared = recipe.configure(&[("shared".to_string(), "True".to_string())], &[]).unwrap();
    host.create(&recipe, &shared).unwrap();
    assert!(host.package_dir().join("lib/libdbcpp.so").exists());

    let static_config = recipe.configure(&[("shared".to_string(), "False".to_string())], &[]).unwrap();
    let report = host.create(&recipe, &static_config).unwrap();

    let dests: Vec<&str> = report.package.copied.iter().map(|c| c.dest.as_str()).collect();
    assert!(dests.contains(&"lib/libdbcpp.a"));
    assert!(!dests.contains(&"lib/libdbcpp.so"));
    assert!(!host.build_dir().join("lib/libdbcpp.so").exists());
    assert!(!host.package_dir().join("lib/libdbcpp.so").exists());
  }

  #[test]
  fn build_starts_from_a_clean_tree() {
    let src = checkout();
    let out = TempDir::new().unwrap();
    let host = LocalHost::new(src.path(), out.path());
    let recipe = recipe();
    let config = recipe.configure(&[], &[]).unwrap();
    write_file(&host.build_dir(), "src/dropped.cpp", "old");

    host.export(&recipe, &config).unwrap();
    host.build(&recipe, &config).unwrap();

    assert!(!host.build_dir().join("src/dropped.cpp").exists());
    assert!(host.build_dir().join("src/db.cpp").exists());
  }
}
