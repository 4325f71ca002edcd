//! Host platform detection.
//!
//! Used to fill the `os` and `arch` settings when the host does not
//! supply them.

pub mod arch;
pub mod os;

use arch::Arch;
use os::Os;
use std::fmt;

/// Platform identifier combining OS and architecture (e.g., "Linux-x86_64")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub os: Os,
  pub arch: Arch,
}

impl Platform {
  pub fn new(os: Os, arch: Arch) -> Self {
    Self { os, arch }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      os: Os::current()?,
      arch: Arch::current()?,
    })
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.os, self.arch)
  }
}
