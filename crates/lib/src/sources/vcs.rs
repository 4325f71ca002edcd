//! Version-control listings.
//!
//! The recipe asks the VCS two questions, each answered with
//! newline-delimited text:
//! - which tracked files are modified in the working tree
//!   (`git status -s --untracked-files=no`)
//! - which files make up the committed tree
//!   (`git ls-tree -r HEAD --name-only`)
//!
//! [`VcsLister`] is the seam; [`GitLister`] shells out to git and tests
//! substitute canned text.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::GIT_ENV;
use crate::exec::{ExecError, run_command, tool_path};

/// Errors from listing files.
#[derive(Debug, Error)]
pub enum VcsError {
  /// The VCS command failed.
  #[error("vcs query failed: {0}")]
  Command(#[from] ExecError),
}

/// Source of the two raw file listings.
pub trait VcsLister {
  /// Short status of modified tracked files, one entry per line.
  fn modified_files(&self) -> Result<String, VcsError>;

  /// Every path in the committed tree, one per line.
  fn tree_files(&self) -> Result<String, VcsError>;
}

/// Lists files by running git in a checkout.
#[derive(Debug, Clone)]
pub struct GitLister {
  repo_dir: PathBuf,
  git: String,
}

impl GitLister {
  /// Use the `git` on `PATH`, or `$DBRECIPE_GIT` when set.
  pub fn new(repo_dir: &Path) -> Self {
    Self {
      repo_dir: repo_dir.to_path_buf(),
      git: tool_path(GIT_ENV, "git"),
    }
  }

  pub fn with_git(mut self, git: &str) -> Self {
    self.git = git.to_string();
    self
  }

  pub fn repo_dir(&self) -> &Path {
    &self.repo_dir
  }

  fn git(&self, args: &[&str]) -> Result<String, VcsError> {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let output = run_command(&self.git, &args, &self.repo_dir, &BTreeMap::new())?;
    Ok(output.stdout)
  }
}

impl VcsLister for GitLister {
  fn modified_files(&self) -> Result<String, VcsError> {
    self.git(&["status", "-s", "--untracked-files=no"])
  }

  fn tree_files(&self) -> Result<String, VcsError> {
    self.git(&["ls-tree", "-r", "HEAD", "--name-only"])
  }
}

/// Reduce short-status lines to paths.
///
/// The first two columns are the index and worktree status; the rest is the
/// path. Rename entries (`old -> new`) yield the new path. Quoted paths are
/// unquoted.
pub fn parse_status(text: &str) -> Vec<String> {
  text
    .lines()
    .map(|line| {
      let path: String = line.chars().skip(2).collect();
      let path = path.trim();
      let path = match path.split_once(" -> ") {
        Some((_, renamed)) => renamed.trim(),
        None => path,
      };
      unquote_path(path)
    })
    .collect()
}

/// Split a tree listing into paths.
pub fn parse_tree(text: &str) -> Vec<String> {
  text.lines().map(unquote_path).collect()
}

/// Undo git's C-style quoting of a path (`"src/a b.cc"`, `"caf\303\251.hh"`).
/// Paths not wrapped in double quotes are returned unchanged.
pub fn unquote_path(path: &str) -> String {
  let Some(inner) = path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) else {
    return path.to_string();
  };

  let mut bytes = Vec::with_capacity(inner.len());
  let mut chars = inner.chars().peekable();
  while let Some(c) = chars.next() {
    if c != '\\' {
      let mut buf = [0u8; 4];
      bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
      continue;
    }
    let Some(escaped) = chars.next() else {
      bytes.push(b'\\');
      break;
    };
    match escaped {
      'a' => bytes.push(0x07),
      'b' => bytes.push(0x08),
      'f' => bytes.push(0x0c),
      'n' => bytes.push(b'\n'),
      'r' => bytes.push(b'\r'),
      't' => bytes.push(b'\t'),
      'v' => bytes.push(0x0b),
      '0'..='7' => {
        let mut value = escaped as u32 - '0' as u32;
        for _ in 0..2 {
          match chars.peek().copied() {
            Some(d @ '0'..='7') => {
              value = value * 8 + (d as u32 - '0' as u32);
              chars.next();
            }
            _ => break,
          }
        }
        bytes.push((value & 0xff) as u8);
      }
      other => {
        let mut buf = [0u8; 4];
        bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
      }
    }
  }
  String::from_utf8_lossy(&bytes).into_owned()
}

/// Query both listings, status first.
pub fn list_sources(lister: &dyn VcsLister) -> Result<(Vec<String>, Vec<String>), VcsError> {
  let status = parse_status(&lister.modified_files()?);
  let tree = parse_tree(&lister.tree_files()?);
  debug!(modified = status.len(), tracked = tree.len(), "listed sources");
  Ok((status, tree))
}
