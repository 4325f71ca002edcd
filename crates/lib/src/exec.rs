//! External command execution.
//!
//! Both collaborators the recipe shells out to (git and the build driver)
//! go through [`run_command`]. Commands inherit the host environment, since
//! compilers and git need `PATH` and `HOME`, but always see a fixed
//! `SOURCE_DATE_EPOCH` so tools that embed timestamps stay reproducible.
//! A non-zero exit is reported as [`ExecError::Failed`] and never retried.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::consts::SOURCE_DATE_EPOCH;

/// Errors from running an external command.
#[derive(Debug, Error)]
pub enum ExecError {
  /// The program could not be started at all.
  #[error("failed to run '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The program ran and exited unsuccessfully. The display carries the
  /// last lines of its stderr.
  #[error("command failed with exit code {code:?}: {cmd}{}", stderr_tail(.stderr))]
  Failed {
    cmd: String,
    code: Option<i32>,
    stderr: String,
  },
}

/// Lines of a failed command's stderr kept in its error message.
const STDERR_TAIL_LINES: usize = 20;

fn stderr_tail(stderr: &str) -> String {
  let lines: Vec<&str> = stderr.trim_end().lines().collect();
  if lines.is_empty() {
    return String::new();
  }
  let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
  format!("\n{}", lines[start..].join("\n"))
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
  pub stdout: String,
  pub stderr: String,
}

/// Resolve a tool executable, honouring an override environment variable.
pub fn tool_path(env_var: &str, default: &str) -> String {
  match std::env::var(env_var) {
    Ok(value) if !value.trim().is_empty() => value,
    _ => default.to_string(),
  }
}

/// Run `program` with `args` in `cwd` and capture its output.
///
/// `env` entries are added on top of the inherited environment and may
/// override `SOURCE_DATE_EPOCH`. Stdout is returned untrimmed; callers that
/// parse line-oriented output depend on leading whitespace.
pub fn run_command(
  program: &str,
  args: &[String],
  cwd: &Path,
  env: &BTreeMap<String, String>,
) -> Result<CommandOutput, ExecError> {
  let cmd_line = display_command(program, args);
  info!(cmd = %cmd_line, "executing command");

  let mut command = Command::new(program);
  command
    .args(args)
    .current_dir(cwd)
    .stdin(Stdio::null())
    .env("SOURCE_DATE_EPOCH", SOURCE_DATE_EPOCH);
  for (key, value) in env {
    command.env(key, value);
  }

  debug!(working_dir = ?cwd, "spawning process");

  let output = command.output().map_err(|source| ExecError::Spawn {
    program: program.to_string(),
    source,
  })?;

  let stdout = String::from_utf8_lossy(&output.stdout).to_string();
  let stderr = String::from_utf8_lossy(&output.stderr).to_string();

  if !output.status.success() {
    if !stderr.is_empty() {
      error!(cmd = %cmd_line, stderr = %stderr.trim_end(), "command failed");
    }
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }
    return Err(ExecError::Failed {
      cmd: cmd_line,
      code: output.status.code(),
      stderr,
    });
  }

  if !stdout.is_empty() {
    debug!(stdout = %stdout.trim_end(), "command output");
  }

  Ok(CommandOutput { stdout, stderr })
}

fn display_command(program: &str, args: &[String]) -> String {
  let mut parts = vec![program.to_string()];
  parts.extend(args.iter().cloned());
  parts.join(" ")
}
