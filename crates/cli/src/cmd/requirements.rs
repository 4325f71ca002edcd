//! Implementation of the `dbrecipe requirements` command.

use anyhow::{Context, Result};

use dbrecipe_lib::recipe::{Recipe, RecipeError};
use dbrecipe_lib::resolve::resolve_definitions;

use crate::cmd::RecipeArgs;
use crate::output::{OutputFormat, print_item, print_json, print_success};

pub fn cmd_requirements(args: &RecipeArgs, output: OutputFormat) -> Result<()> {
  let session = args.session()?;
  let requirements = session
    .recipe
    .requirements(&session.config)
    .context("Failed to resolve requirements")?;
  let definitions = resolve_definitions(&session.recipe.table().features, &session.config)
    .map_err(RecipeError::from)
    .context("Failed to resolve build definitions")?;

  if output.is_json() {
    return print_json(&serde_json::json!({
      "requirements": requirements,
      "definitions": definitions,
    }));
  }

  print_success(&format!("{} requirement(s)", requirements.len()));
  for reference in &requirements {
    print_item(&reference.to_string());
  }
  if !definitions.is_empty() {
    println!();
    println!("Definitions:");
    for (key, value) in &definitions {
      print_item(&format!("{}={}", key, value));
    }
  }
  Ok(())
}
