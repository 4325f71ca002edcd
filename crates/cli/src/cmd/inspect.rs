//! Implementation of the `dbrecipe inspect` command.

use anyhow::Result;

use dbrecipe_lib::recipe::Recipe;

use crate::cmd::RecipeArgs;
use crate::output::{OutputFormat, print_item, print_json, print_stat, print_success, symbols};

pub fn cmd_inspect(args: &RecipeArgs, output: OutputFormat) -> Result<()> {
  let session = args.session()?;
  let table = session.recipe.table();
  let meta = session.recipe.metadata();

  if output.is_json() {
    let json = serde_json::json!({
      "recipe": table,
      "options": session.config.options,
      "settings": session.config.settings,
    });
    return print_json(&json);
  }

  print_success(&format!("Recipe: {}", meta.name));
  if let Some(description) = &meta.description {
    print_stat("Description", description);
  }
  if let Some(license) = &meta.license {
    print_stat("License", license);
  }
  if let Some(url) = &meta.url {
    print_stat("URL", url);
  }
  print_stat("Build policy", &meta.build_policy);

  println!();
  println!("Options:");
  for decl in &table.options {
    let current = session
      .config
      .value(&decl.name)
      .map(|v| v.to_string())
      .unwrap_or_default();
    print_item(&format!("{} = {}  [{}]", decl.name, current, decl.allowed_display()));
  }

  println!();
  println!("Settings:");
  for name in &table.settings {
    let value = session.config.setting(name).unwrap_or("-");
    print_item(&format!("{} = {}", name, value));
  }

  println!();
  println!("Features:");
  for feature in &table.features {
    print_item(&format!(
      "{} {} {} (+{})",
      feature.option,
      symbols::ARROW,
      feature.requires,
      feature.define
    ));
  }

  println!();
  println!("Artifacts:");
  for rule in &table.artifacts {
    let dst = if rule.dst.is_empty() { "." } else { rule.dst.as_str() };
    let mut flags = Vec::new();
    if rule.flatten {
      flags.push("flat");
    }
    if rule.symlinks {
      flags.push("symlinks");
    }
    let suffix = if flags.is_empty() {
      String::new()
    } else {
      format!(" ({})", flags.join(", "))
    };
    print_item(&format!("{} {} {}{}", rule.pattern, symbols::ARROW, dst, suffix));
  }

  Ok(())
}
