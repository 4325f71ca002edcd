use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::OptionError;
use crate::platform::Platform;

/// A single option value.
///
/// Boolean options render as `True`/`False`, the spelling package hosts use
/// on their command lines and in lock files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
  Bool(bool),
  Text(String),
}

impl OptionValue {
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      OptionValue::Bool(b) => Some(*b),
      OptionValue::Text(_) => None,
    }
  }

  /// Whether the raw host string `raw` denotes this value.
  pub fn accepts(&self, raw: &str) -> bool {
    match self {
      OptionValue::Bool(b) => parse_bool(raw) == Some(*b),
      OptionValue::Text(t) => t == raw.trim(),
    }
  }
}

impl fmt::Display for OptionValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OptionValue::Bool(true) => write!(f, "True"),
      OptionValue::Bool(false) => write!(f, "False"),
      OptionValue::Text(t) => write!(f, "{}", t),
    }
  }
}

impl From<bool> for OptionValue {
  fn from(value: bool) -> Self {
    OptionValue::Bool(value)
  }
}

impl From<&str> for OptionValue {
  fn from(value: &str) -> Self {
    OptionValue::Text(value.to_string())
  }
}

/// Parse a boolean the way hosts spell it: `True`/`False` in any case, or `1`/`0`.
pub fn parse_bool(raw: &str) -> Option<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "true" | "1" => Some(true),
    "false" | "0" => Some(false),
    _ => None,
  }
}

/// Declaration of one recipe option: its name, allowed values and default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDecl {
  pub name: String,
  pub values: Vec<OptionValue>,
  #[serde(default)]
  pub default: Option<OptionValue>,
}

impl OptionDecl {
  /// A `{True, False}` option with the given default.
  pub fn boolean(name: &str, default: bool) -> Self {
    Self {
      name: name.to_string(),
      values: vec![OptionValue::Bool(true), OptionValue::Bool(false)],
      default: Some(OptionValue::Bool(default)),
    }
  }

  pub fn allows(&self, value: &OptionValue) -> bool {
    self.values.contains(value)
  }

  /// Map a raw host string onto one of the declared values.
  pub fn parse(&self, raw: &str) -> Result<OptionValue, OptionError> {
    self
      .values
      .iter()
      .find(|v| v.accepts(raw))
      .cloned()
      .ok_or_else(|| OptionError::InvalidValue {
        name: self.name.clone(),
        value: raw.to_string(),
        allowed: self.allowed_display(),
      })
  }

  /// Check the declaration itself: a non-empty domain containing the default.
  pub fn validate(&self) -> Result<(), OptionError> {
    if self.name.trim().is_empty() {
      return Err(OptionError::InvalidDeclaration {
        name: self.name.clone(),
        message: "option name is empty".to_string(),
      });
    }
    if self.values.is_empty() {
      return Err(OptionError::InvalidDeclaration {
        name: self.name.clone(),
        message: "no allowed values".to_string(),
      });
    }
    match &self.default {
      Some(default) if !self.allows(default) => Err(OptionError::InvalidDeclaration {
        name: self.name.clone(),
        message: format!("default '{}' is not one of [{}]", default, self.allowed_display()),
      }),
      _ => Ok(()),
    }
  }

  pub fn allowed_display(&self) -> String {
    self.values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
  }
}

/// Host platform/toolchain descriptors (`os`, `compiler`, `build_type`, `arch`).
///
/// Opaque to the recipe logic; only forwarded to the build driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub BTreeMap<String, String>);

impl Settings {
  pub fn get(&self, name: &str) -> Option<&str> {
    self.0.get(name).map(String::as_str)
  }

  pub fn set(&mut self, name: &str, value: &str) {
    self.0.insert(name.to_string(), value.to_string());
  }

  /// Fill `os` and `arch` from the running platform where they are declared
  /// but not already set.
  pub fn fill_detected(&mut self, declared: &[String]) {
    let Some(platform) = Platform::current() else {
      return;
    };
    let detected = [("os", platform.os.to_string()), ("arch", platform.arch.to_string())];
    for (name, value) in detected {
      if declared.iter().any(|d| d == name) && !self.0.contains_key(name) {
        self.0.insert(name.to_string(), value);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bool_parsing_accepts_host_spellings() {
    assert_eq!(parse_bool("True"), Some(true));
    assert_eq!(parse_bool("false"), Some(false));
    assert_eq!(parse_bool("1"), Some(true));
    assert_eq!(parse_bool(" 0 "), Some(false));
    assert_eq!(parse_bool("yes"), None);
    assert_eq!(parse_bool(""), None);
  }

  #[test]
  fn bool_values_render_capitalized() {
    assert_eq!(OptionValue::Bool(true).to_string(), "True");
    assert_eq!(OptionValue::Bool(false).to_string(), "False");
    assert_eq!(OptionValue::from("static").to_string(), "static");
  }

  #[test]
  fn parse_maps_onto_declared_value() {
    let decl = OptionDecl::boolean("shared", true);
    assert_eq!(decl.parse("FALSE").unwrap(), OptionValue::Bool(false));
  }

  #[test]
  fn parse_rejects_out_of_domain() {
    let decl = OptionDecl::boolean("with_pq", true);
    let err = decl.parse("maybe").unwrap_err();
    assert!(matches!(err, OptionError::InvalidValue { ref name, .. } if name == "with_pq"));
  }

  #[test]
  fn text_domain_matches_exactly() {
    let decl = OptionDecl {
      name: "runtime".to_string(),
      values: vec!["MD".into(), "MT".into()],
      default: None,
    };
    assert_eq!(decl.parse("MT").unwrap(), OptionValue::from("MT"));
    assert!(decl.parse("mt").is_err());
  }

  #[test]
  fn validate_rejects_default_outside_domain() {
    let decl = OptionDecl {
      name: "fpic".to_string(),
      values: vec![OptionValue::Bool(true)],
      default: Some(OptionValue::Bool(false)),
    };
    assert!(matches!(decl.validate(), Err(OptionError::InvalidDeclaration { .. })));
  }

  #[test]
  fn fill_detected_keeps_host_values() {
    let declared = vec!["os".to_string(), "arch".to_string()];
    let mut settings = Settings::default();
    settings.set("os", "Windows");
    settings.fill_detected(&declared);

    assert_eq!(settings.get("os"), Some("Windows"));
    assert!(settings.get("arch").is_some());
  }

  #[test]
  fn fill_detected_ignores_undeclared() {
    let mut settings = Settings::default();
    settings.fill_detected(&[]);
    assert!(settings.0.is_empty());
  }
}
