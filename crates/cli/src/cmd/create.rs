//! Implementation of the `dbrecipe create` command.
//!
//! Runs requirements, export, build, package and info in order, stopping at
//! the first failure.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use dbrecipe_lib::recipe::Recipe;
use dbrecipe_lib::util::hash::{ContentHash, hash_bytes};

use crate::cmd::RecipeArgs;
use crate::cmd::info::print_info_text;
use crate::cmd::package::print_report;
use crate::output::{OutputFormat, format_duration, print_info, print_json, print_success, truncate_hash};

pub fn cmd_create(args: &RecipeArgs, output: OutputFormat) -> Result<()> {
  let session = args.session()?;
  let start = Instant::now();

  let report = session
    .host
    .create(&session.recipe, &session.config)
    .with_context(|| format!("Failed to create {}", session.recipe.metadata().name))?;

  if output.is_json() {
    return print_json(&report);
  }

  print_info(&format!(
    "Requirements: {}",
    report
      .requirements
      .iter()
      .map(|r| r.to_string())
      .collect::<Vec<_>>()
      .join(", ")
  ));
  print_info(&format!("Exported {} file(s)", report.export.staged.len()));
  for (key, value) in &report.build.definitions {
    print_info(&format!("-D{}={}", key, value));
  }
  print_report(&report.package, &session.host.package_dir().display().to_string(), true);
  print_info_text(&report.info);

  let digest = manifest_digest(&report.package.manifest)?;
  print_success(&format!(
    "Created {} ({}) in {}",
    session.recipe.metadata().name,
    truncate_hash(&digest.0),
    format_duration(start.elapsed())
  ));
  Ok(())
}

/// Digest of the package manifest, identifying the package contents.
fn manifest_digest(manifest: &Path) -> Result<ContentHash> {
  let content = std::fs::read_to_string(manifest)
    .with_context(|| format!("Failed to read package manifest {}", manifest.display()))?;
  Ok(hash_bytes(content.as_bytes()))
}
