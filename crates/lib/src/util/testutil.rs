//! Test utilities for dbrecipe-lib.
//!
//! Cross-platform helpers for tests that build fake source and build trees.

use std::fs;
use std::path::Path;

/// Cross-platform symlink creation helper.
pub fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
  #[cfg(unix)]
  {
    std::os::unix::fs::symlink(target, link)
  }
  #[cfg(windows)]
  {
    std::os::windows::fs::symlink_file(target, link)
  }
}

/// Write `content` at `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, content).unwrap();
}

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}
