//! Recipe options and the per-invocation configuration bundle.
//!
//! A recipe declares its options (`shared`, `with_pq`, ...) with a closed set
//! of allowed values and a default. The host supplies `name=value`
//! assignments; [`ConfigBundle::resolve`] validates them against the
//! declarations and produces the immutable bundle every lifecycle call reads.
//!
//! Validation fails fast: an unknown option, a value outside the declared
//! domain, or an option with neither value nor default is an
//! [`OptionError`]. A silently defaulted option would build a library that
//! links fine but lacks the backend the caller asked for.

mod types;

pub use types::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised while validating options and settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
  /// An assignment was not of the form `name=value`.
  #[error("invalid assignment '{0}', expected name=value")]
  InvalidAssignment(String),

  /// The option is not declared by the recipe.
  #[error("unknown option '{0}'")]
  UnknownOption(String),

  /// The value is outside the option's declared domain.
  #[error("invalid value '{value}' for option '{name}', allowed: [{allowed}]")]
  InvalidValue {
    name: String,
    value: String,
    allowed: String,
  },

  /// The option has no value and no default.
  #[error("option '{0}' has no value")]
  MissingValue(String),

  /// A boolean was required but the option holds something else.
  #[error("option '{name}' is not boolean (value '{value}')")]
  NotBoolean { name: String, value: String },

  /// The setting is not declared by the recipe.
  #[error("unknown setting '{0}'")]
  UnknownSetting(String),

  /// The recipe's own option declaration is inconsistent.
  #[error("invalid declaration of option '{name}': {message}")]
  InvalidDeclaration { name: String, message: String },
}

/// Split a host assignment `name=value` at the first `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), OptionError> {
  let Some((name, value)) = raw.split_once('=') else {
    return Err(OptionError::InvalidAssignment(raw.to_string()));
  };
  let name = name.trim();
  if name.is_empty() {
    return Err(OptionError::InvalidAssignment(raw.to_string()));
  }
  Ok((name.to_string(), value.trim().to_string()))
}

/// Option values and settings for one recipe invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBundle {
  pub options: BTreeMap<String, OptionValue>,
  #[serde(default)]
  pub settings: Settings,
}

impl ConfigBundle {
  /// Build a bundle directly from already-validated values.
  pub fn new(options: BTreeMap<String, OptionValue>, settings: Settings) -> Self {
    Self { options, settings }
  }

  /// Validate host assignments against the recipe's declarations.
  ///
  /// Starts from declared defaults, then applies `options` in order (a later
  /// assignment of the same name wins). Settings must be declared; `os` and
  /// `arch` fall back to the detected platform.
  pub fn resolve(
    decls: &[OptionDecl],
    declared_settings: &[String],
    options: &[(String, String)],
    settings: &[(String, String)],
  ) -> Result<Self, OptionError> {
    let mut values = BTreeMap::new();

    for decl in decls {
      decl.validate()?;
      if let Some(default) = &decl.default {
        values.insert(decl.name.clone(), default.clone());
      }
    }

    for (name, raw) in options {
      let decl = decls
        .iter()
        .find(|d| &d.name == name)
        .ok_or_else(|| OptionError::UnknownOption(name.clone()))?;
      let value = decl.parse(raw)?;
      debug!(option = %name, value = %value, "option assigned");
      values.insert(name.clone(), value);
    }

    for decl in decls {
      if !values.contains_key(&decl.name) {
        return Err(OptionError::MissingValue(decl.name.clone()));
      }
    }

    let mut resolved_settings = Settings::default();
    for (name, value) in settings {
      if !declared_settings.iter().any(|s| s == name) {
        return Err(OptionError::UnknownSetting(name.clone()));
      }
      resolved_settings.set(name, value);
    }
    resolved_settings.fill_detected(declared_settings);

    Ok(Self {
      options: values,
      settings: resolved_settings,
    })
  }

  pub fn value(&self, name: &str) -> Option<&OptionValue> {
    self.options.get(name)
  }

  /// Read a boolean option, failing when it is absent or not boolean.
  pub fn flag(&self, name: &str) -> Result<bool, OptionError> {
    let value = self
      .options
      .get(name)
      .ok_or_else(|| OptionError::MissingValue(name.to_string()))?;
    value.as_bool().ok_or_else(|| OptionError::NotBoolean {
      name: name.to_string(),
      value: value.to_string(),
    })
  }

  pub fn setting(&self, name: &str) -> Option<&str> {
    self.settings.get(name)
  }
}
