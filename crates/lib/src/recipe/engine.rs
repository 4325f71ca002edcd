//! A [`Recipe`] driven entirely by a [`RecipeTable`].

use std::path::Path;

use tracing::info;

use crate::build::{BuildDriver, BuildLayout, BuildRequest, BuildResult};
use crate::options::ConfigBundle;
use crate::package::{ArtifactRule, PackageInfo};
use crate::recipe::{Metadata, Recipe, RecipeError, RecipeTable};
use crate::requirements::Requirements;
use crate::resolve::{resolve_definitions, resolve_requirements};
use crate::sources::{VcsLister, canonical_file_set};

/// Table-driven recipe with pluggable VCS and build collaborators.
pub struct TableRecipe {
  table: RecipeTable,
  lister: Box<dyn VcsLister>,
  driver: Box<dyn BuildDriver>,
}

impl TableRecipe {
  /// Validates `table` up front so no lifecycle call starts on a broken recipe.
  pub fn new(table: RecipeTable, lister: Box<dyn VcsLister>, driver: Box<dyn BuildDriver>) -> Result<Self, RecipeError> {
    table.validate()?;
    Ok(Self { table, lister, driver })
  }

  pub fn table(&self) -> &RecipeTable {
    &self.table
  }

  /// Validate host `name=value` pairs into a bundle for this recipe.
  pub fn configure(
    &self,
    options: &[(String, String)],
    settings: &[(String, String)],
  ) -> Result<ConfigBundle, RecipeError> {
    Ok(ConfigBundle::resolve(
      &self.table.options,
      &self.table.settings,
      options,
      settings,
    )?)
  }

  /// The request handed to the build driver for `config`.
  pub fn build_request(&self, config: &ConfigBundle, layout: &BuildLayout) -> Result<BuildRequest, RecipeError> {
    let definitions = resolve_definitions(&self.table.features, config)?;
    let shared = if self.table.has_shared_option() {
      Some(config.flag("shared")?)
    } else {
      None
    };
    Ok(BuildRequest {
      layout: layout.clone(),
      definitions,
      shared,
      build_type: config.setting("build_type").map(str::to_string),
      verbose: self.table.verbose,
    })
  }
}

impl Recipe for TableRecipe {
  fn metadata(&self) -> &Metadata {
    &self.table.metadata
  }

  fn requirements(&self, config: &ConfigBundle) -> Result<Requirements, RecipeError> {
    Ok(resolve_requirements(&self.table.requires, &self.table.features, config)?)
  }

  fn export_sources(&self, _config: &ConfigBundle) -> Result<Vec<String>, RecipeError> {
    let files = canonical_file_set(self.lister.as_ref())?;
    info!(recipe = %self.table.metadata.name, files = files.len(), "export file set");
    Ok(files)
  }

  fn build(&self, config: &ConfigBundle, layout: &BuildLayout) -> Result<BuildResult, RecipeError> {
    // Resolve everything before the driver touches the build folder.
    let request = self.build_request(config, layout)?;
    info!(
      recipe = %self.table.metadata.name,
      definitions = request.definitions.len(),
      "building"
    );

    self.driver.configure(&request)?;
    self.driver.build(&request)?;

    Ok(BuildResult {
      output_dir: layout.build_dir.clone(),
      definitions: request.all_definitions(),
    })
  }

  fn package(&self, _config: &ConfigBundle, _build: &BuildResult) -> Result<Vec<ArtifactRule>, RecipeError> {
    Ok(self.table.artifacts.clone())
  }

  fn package_info(&self, package_dir: &Path) -> Result<PackageInfo, RecipeError> {
    Ok(PackageInfo::from_package(package_dir)?)
  }
}
