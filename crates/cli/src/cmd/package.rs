//! Implementation of the `dbrecipe package` command.
//!
//! Applies the recipe's artifact rules to the build recorded by the last
//! `dbrecipe build`.

use anyhow::{Context, Result};

use dbrecipe_lib::package::PackageReport;

use crate::cmd::RecipeArgs;
use crate::output::{OutputFormat, print_item, print_json, print_stat, print_success, symbols};

pub fn cmd_package(args: &RecipeArgs, output: OutputFormat) -> Result<()> {
  let session = args.session()?;
  let build = session.host.last_build().context("No build to package")?;
  let report = session
    .host
    .package(&session.recipe, &session.config, &build)
    .context("Failed to assemble package")?;

  if output.is_json() {
    return print_json(&report);
  }

  print_report(&report, &session.host.package_dir().display().to_string(), false);
  Ok(())
}

pub(crate) fn print_report(report: &PackageReport, package_dir: &str, quiet: bool) {
  print_success(&format!("Packaged {} file(s)", report.copied.len()));
  print_stat("Package", package_dir);
  if quiet {
    return;
  }
  for artifact in &report.copied {
    match &artifact.link {
      Some(target) => print_item(&format!("{} {} {}", artifact.dest, symbols::LINK, target)),
      None => print_item(&artifact.dest),
    }
  }
}
