//! Implementation of the `dbrecipe build` command.

use std::time::Instant;

use anyhow::{Context, Result};

use crate::cmd::RecipeArgs;
use crate::output::{OutputFormat, format_duration, print_item, print_json, print_stat, print_success};

pub fn cmd_build(args: &RecipeArgs, output: OutputFormat) -> Result<()> {
  let session = args.session()?;
  let start = Instant::now();

  let result = session
    .host
    .build(&session.recipe, &session.config)
    .context("Build failed")?;

  if output.is_json() {
    return print_json(&result);
  }

  print_success(&format!("Built in {}", format_duration(start.elapsed())));
  print_stat("Output", &result.output_dir.display().to_string());
  println!("Definitions:");
  for (key, value) in &result.definitions {
    print_item(&format!("-D{}={}", key, value));
  }
  Ok(())
}
