use std::fmt;

/// CPU architectures, named the way package settings spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X86,
  X86_64,
  Armv7,
  Armv8,
}

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86" => Some(Self::X86),
      "x86_64" => Some(Self::X86_64),
      "arm" => Some(Self::Armv7),
      "aarch64" => Some(Self::Armv8),
      _ => None,
    }
  }

  /// Returns the settings value for this architecture
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86 => "x86",
      Self::X86_64 => "x86_64",
      Self::Armv7 => "armv7",
      Self::Armv8 => "armv8",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
