use std::fmt;

/// Operating systems a package can be built for, named the way package
/// settings spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  Macos,
  Windows,
  FreeBsd,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::Macos),
      "windows" => Some(Self::Windows),
      "freebsd" => Some(Self::FreeBsd),
      _ => None,
    }
  }

  /// Returns the settings value for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "Linux",
      Self::Macos => "Macos",
      Self::Windows => "Windows",
      Self::FreeBsd => "FreeBSD",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
