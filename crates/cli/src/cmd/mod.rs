mod build;
mod create;
mod export;
mod info;
mod inspect;
mod package;
mod requirements;

pub use build::cmd_build;
pub use create::cmd_create;
pub use export::cmd_export;
pub use info::cmd_info;
pub use inspect::cmd_inspect;
pub use package::cmd_package;
pub use requirements::cmd_requirements;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use dbrecipe_lib::build::CmakeDriver;
use dbrecipe_lib::consts::RECIPE_FILE;
use dbrecipe_lib::options::{ConfigBundle, parse_assignment};
use dbrecipe_lib::recipe::lua::load_table;
use dbrecipe_lib::recipe::{LocalHost, RecipeError, RecipeTable, TableRecipe};
use dbrecipe_lib::sources::GitLister;

/// Flags shared by every subcommand.
#[derive(Debug, Clone)]
pub struct RecipeArgs {
  pub options: Vec<String>,
  pub settings: Vec<String>,
  pub recipe: Option<PathBuf>,
  pub source: PathBuf,
  pub out: PathBuf,
}

/// A loaded recipe, its validated configuration and the local host.
pub struct Session {
  pub recipe: TableRecipe,
  pub config: ConfigBundle,
  pub host: LocalHost,
}

impl RecipeArgs {
  /// `--recipe` if given, else `recipe.lua` in the checkout, else built-in.
  pub fn load_table(&self) -> Result<RecipeTable> {
    let path = match &self.recipe {
      Some(path) => Some(path.clone()),
      None => {
        let candidate = self.source.join(RECIPE_FILE);
        candidate.is_file().then_some(candidate)
      }
    };
    match path {
      Some(path) => load_table(&path)
        .map_err(RecipeError::from)
        .with_context(|| format!("Failed to load recipe: {}", path.display())),
      None => {
        debug!("using built-in dbcpp recipe");
        Ok(RecipeTable::dbcpp())
      }
    }
  }

  pub fn session(&self) -> Result<Session> {
    let table = self.load_table()?;
    let recipe = TableRecipe::new(table, Box::new(GitLister::new(&self.source)), Box::new(CmakeDriver::new()))
      .context("Invalid recipe")?;

    let options = parse_pairs(&self.options)?;
    let settings = parse_pairs(&self.settings)?;
    let config = recipe
      .configure(&options, &settings)
      .context("Invalid configuration")?;

    Ok(Session {
      recipe,
      config,
      host: LocalHost::new(&self.source, &self.out),
    })
  }
}

fn parse_pairs(raw: &[String]) -> Result<Vec<(String, String)>> {
  raw
    .iter()
    .map(|item| {
      parse_assignment(item)
        .map_err(RecipeError::from)
        .with_context(|| format!("Invalid assignment: {}", item))
    })
    .collect()
}
