//! Implementation of the `dbrecipe export` command.
//!
//! Lists modified and committed files through git, merges them into the
//! canonical file set and stages it under `<out>/export`.

use anyhow::{Context, Result};

use crate::cmd::RecipeArgs;
use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success};

pub fn cmd_export(args: &RecipeArgs, output: OutputFormat) -> Result<()> {
  let session = args.session()?;
  let staged = session
    .host
    .export(&session.recipe, &session.config)
    .with_context(|| format!("Failed to export sources from {}", args.source.display()))?;

  if output.is_json() {
    return print_json(&staged);
  }

  print_success(&format!("Exported {} file(s)", staged.staged.len()));
  if !staged.skipped.is_empty() {
    print_info(&format!("Skipped {} non-file entries", staged.skipped.len()));
  }
  print_stat("Export", &session.host.export_dir().display().to_string());
  print_stat("Manifest", &staged.manifest.display().to_string());
  Ok(())
}
