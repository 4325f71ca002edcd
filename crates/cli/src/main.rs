mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dbrecipe_lib::recipe::{ErrorKind, RecipeError};

use crate::cmd::RecipeArgs;
use crate::output::{OutputFormat, print_error};

/// dbrecipe - build and package dbcpp from a local checkout
#[derive(Parser)]
#[command(name = "dbrecipe")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  /// Option assignment (repeatable), e.g. -o with_pq=False
  #[arg(short = 'o', long = "option", global = true, value_name = "NAME=VALUE")]
  options: Vec<String>,

  /// Setting assignment (repeatable), e.g. -s build_type=Release
  #[arg(short = 's', long = "setting", global = true, value_name = "NAME=VALUE")]
  settings: Vec<String>,

  /// Recipe file to load instead of the built-in dbcpp recipe
  #[arg(long, global = true)]
  recipe: Option<PathBuf>,

  /// Checkout root
  #[arg(long, global = true, default_value = ".")]
  source: PathBuf,

  /// Work root holding export/, build/ and package/
  #[arg(long, global = true, default_value = "dbrecipe-out")]
  out: PathBuf,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show recipe metadata, options, settings and artifact rules
  Inspect,

  /// List the requirements for the given options
  Requirements,

  /// Stage the canonical file set into <out>/export
  Export,

  /// Configure and build <out>/export in <out>/build
  Build,

  /// Assemble <out>/package from the last build
  Package,

  /// Show the libraries and directories an assembled package provides
  Info,

  /// Run every stage: requirements, export, build, package, info
  Create,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .without_time()
    .with_writer(std::io::stderr)
    .init();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::from(exit_code(&err))
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let args = RecipeArgs {
    options: cli.options,
    settings: cli.settings,
    recipe: cli.recipe,
    source: cli.source,
    out: cli.out,
  };
  let output = cli.output;

  match cli.command {
    Commands::Inspect => cmd::cmd_inspect(&args, output),
    Commands::Requirements => cmd::cmd_requirements(&args, output),
    Commands::Export => cmd::cmd_export(&args, output),
    Commands::Build => cmd::cmd_build(&args, output),
    Commands::Package => cmd::cmd_package(&args, output),
    Commands::Info => cmd::cmd_info(&args, output),
    Commands::Create => cmd::cmd_create(&args, output),
  }
}

/// 2 for configuration errors, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> u8 {
  match err.downcast_ref::<RecipeError>() {
    Some(recipe_err) if recipe_err.kind() == ErrorKind::Configuration => 2,
    _ => 1,
  }
}
