//! Package references and the ordered requirement set.
//!
//! A reference names one external dependency as
//! `name/version@user/channel` (the `@user/channel` part is optional).
//! [`Requirements`] keeps references in insertion order and adds each
//! dependency at most once, keyed on its name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors for references and requirement sets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequirementError {
  /// The reference string is malformed.
  #[error("invalid reference '{reference}': {message}")]
  InvalidReference { reference: String, message: String },

  /// The same dependency was required twice with different coordinates.
  #[error("conflicting requirements for '{name}': {existing} vs {requested}")]
  Conflict {
    name: String,
    existing: String,
    requested: String,
  },
}

/// A dependency reference: name, version and source channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference {
  pub name: String,
  pub version: String,
  pub user: Option<String>,
  pub channel: Option<String>,
}

impl Reference {
  pub fn new(name: &str, version: &str) -> Self {
    Self {
      name: name.to_string(),
      version: version.to_string(),
      user: None,
      channel: None,
    }
  }

  pub fn with_channel(mut self, user: &str, channel: &str) -> Self {
    self.user = Some(user.to_string());
    self.channel = Some(channel.to_string());
    self
  }
}

fn invalid(reference: &str, message: &str) -> RequirementError {
  RequirementError::InvalidReference {
    reference: reference.to_string(),
    message: message.to_string(),
  }
}

fn check_part(reference: &str, part: &str, what: &str) -> Result<String, RequirementError> {
  if part.is_empty() {
    return Err(invalid(reference, &format!("empty {}", what)));
  }
  if part.chars().any(|c| c.is_whitespace() || c == '/' || c == '@') {
    return Err(invalid(reference, &format!("bad character in {}", what)));
  }
  Ok(part.to_string())
}

impl FromStr for Reference {
  type Err = RequirementError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let raw = s.trim();
    let (coords, source) = match raw.split_once('@') {
      Some((coords, source)) => (coords, Some(source)),
      None => (raw, None),
    };

    let (name, version) = coords
      .split_once('/')
      .ok_or_else(|| invalid(raw, "expected name/version"))?;

    let mut reference = Reference {
      name: check_part(raw, name, "name")?,
      version: check_part(raw, version, "version")?,
      user: None,
      channel: None,
    };

    if let Some(source) = source {
      let (user, channel) = source
        .split_once('/')
        .ok_or_else(|| invalid(raw, "expected @user/channel"))?;
      reference.user = Some(check_part(raw, user, "user")?);
      reference.channel = Some(check_part(raw, channel, "channel")?);
    }

    Ok(reference)
  }
}

impl TryFrom<String> for Reference {
  type Error = RequirementError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<Reference> for String {
  fn from(value: Reference) -> Self {
    value.to_string()
  }
}

impl fmt::Display for Reference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.name, self.version)?;
    if let (Some(user), Some(channel)) = (&self.user, &self.channel) {
      write!(f, "@{}/{}", user, channel)?;
    }
    Ok(())
  }
}

/// Ordered set of requirements, unique by dependency name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Requirements(Vec<Reference>);

impl Requirements {
  pub fn new() -> Self {
    Self(Vec::new())
  }

  /// Add a requirement.
  ///
  /// Returns `Ok(true)` when it was added, `Ok(false)` when the identical
  /// reference was already present, and an error when the same name is
  /// already required with a different version or channel.
  pub fn add(&mut self, reference: Reference) -> Result<bool, RequirementError> {
    if let Some(existing) = self.0.iter().find(|r| r.name == reference.name) {
      if *existing == reference {
        debug!(reference = %reference, "requirement already present");
        return Ok(false);
      }
      return Err(RequirementError::Conflict {
        name: reference.name.clone(),
        existing: existing.to_string(),
        requested: reference.to_string(),
      });
    }
    self.0.push(reference);
    Ok(true)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.iter().any(|r| r.name == name)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn into_vec(self) -> Vec<Reference> {
    self.0
  }
}

impl<'a> IntoIterator for &'a Requirements {
  type Item = &'a Reference;
  type IntoIter = std::slice::Iter<'a, Reference>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}
