use anyhow::{Context, Result};

use dbrecipe_lib::package::PackageInfo;

use crate::cmd::RecipeArgs;
use crate::output::{OutputFormat, print_json, print_stat, print_success};

pub fn cmd_info(args: &RecipeArgs, output: OutputFormat) -> Result<()> {
  let session = args.session()?;
  let info = session
    .host
    .info(&session.recipe)
    .context("Failed to read package")?;

  if output.is_json() {
    return print_json(&info);
  }

  print_info_text(&info);
  Ok(())
}

pub(crate) fn print_info_text(info: &PackageInfo) {
  print_success(&format!("{} librar(ies)", info.libs.len()));
  print_stat("Libs", &info.libs.join(" "));
  print_stat("Include dirs", &info.include_dirs.join(" "));
  print_stat("Lib dirs", &info.lib_dirs.join(" "));
  print_stat("Bin dirs", &info.bin_dirs.join(" "));
}
