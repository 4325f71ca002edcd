//! Declarative recipe data.

use std::collections::HashSet;

use glob::Pattern;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::{OptionDecl, OptionError, OptionValue};
use crate::package::{ArtifactRule, default_rules};
use crate::requirements::Reference;
use crate::resolve::Feature;

/// Errors in a recipe table or while loading one.
#[derive(Debug, Error)]
pub enum TableError {
  #[error("failed to read recipe {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  /// Evaluation or conversion failed inside Lua.
  #[error("lua error: {0}")]
  Lua(String),

  #[error("recipe {0} must return a table")]
  NotATable(String),

  #[error(transparent)]
  Option(#[from] OptionError),

  #[error("invalid recipe: {0}")]
  Invalid(String),
}

// Stored as text so TableError is Send + Sync.
impl From<mlua::Error> for TableError {
  fn from(err: mlua::Error) -> Self {
    TableError::Lua(err.to_string())
  }
}

/// Descriptive fields reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub license: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default)]
  pub topics: Vec<String>,
  /// When the host should build from source (`missing`, `always`, `never`).
  #[serde(default = "default_build_policy")]
  pub build_policy: String,
}

fn default_build_policy() -> String {
  "missing".to_string()
}

fn default_verbose() -> bool {
  true
}

/// Everything a recipe decides, as data.
///
/// Ordered parts (options, requirements, features, artifact rules) are
/// sequences so that table order is the resolution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeTable {
  pub metadata: Metadata,
  /// Host settings the recipe accepts.
  #[serde(default)]
  pub settings: Vec<String>,
  #[serde(default)]
  pub options: Vec<OptionDecl>,
  /// Always-required dependencies.
  #[serde(default)]
  pub requires: Vec<Reference>,
  #[serde(default)]
  pub features: Vec<Feature>,
  #[serde(default = "default_rules")]
  pub artifacts: Vec<ArtifactRule>,
  /// Ask the build driver for verbose output.
  #[serde(default = "default_verbose")]
  pub verbose: bool,
}

impl RecipeTable {
  /// The built-in table for dbcpp.
  pub fn dbcpp() -> Self {
    let channel = |reference: Reference, user: &str| reference.with_channel(user, "stable");

    Self {
      metadata: Metadata {
        name: "dbcpp".to_string(),
        version: None,
        license: Some("BSD-2-Clause".to_string()),
        author: Some("Thomas Santanello <tcsantanello@gmail.com>".to_string()),
        url: Some("https://gogs.apps.nemesus.homeip.net/c-cpp-projects/dbcpp.git".to_string()),
        description: Some("Unified Database abstraction for C++".to_string()),
        topics: vec!["database".to_string()],
        build_policy: default_build_policy(),
      },
      settings: ["os", "compiler", "build_type", "arch"].iter().map(|s| s.to_string()).collect(),
      options: vec![
        OptionDecl::boolean("shared", true),
        OptionDecl::boolean("with_pq", true),
        OptionDecl::boolean("with_sqlite3", true),
      ],
      requires: vec![
        channel(Reference::new("boost", "1.68.0"), "conan"),
        channel(Reference::new("spdlog", "1.3.0"), "bincrafters"),
        channel(Reference::new("cppuri", "1.0.0"), "tcsantanello"),
      ],
      features: vec![
        Feature {
          option: "with_pq".to_string(),
          requires: channel(Reference::new("libpq", "11.5"), "bincrafters"),
          define: "POSTGRESQL_ENABLE".to_string(),
        },
        Feature {
          option: "with_sqlite3".to_string(),
          requires: channel(Reference::new("sqlite3", "3.29.0"), "bincrafters"),
          define: "SQLITE3_ENABLE".to_string(),
        },
      ],
      artifacts: default_rules(),
      verbose: true,
    }
  }

  /// Check the table is self-consistent before any lifecycle call runs.
  pub fn validate(&self) -> Result<(), TableError> {
    if self.metadata.name.trim().is_empty() {
      return Err(TableError::Invalid("metadata.name is empty".to_string()));
    }

    let mut seen = HashSet::new();
    for decl in &self.options {
      decl.validate()?;
      if !seen.insert(decl.name.as_str()) {
        return Err(TableError::Invalid(format!("option '{}' declared twice", decl.name)));
      }
    }

    for feature in &self.features {
      let Some(decl) = self.options.iter().find(|d| d.name == feature.option) else {
        return Err(TableError::Invalid(format!(
          "feature '{}' uses undeclared option '{}'",
          feature.define, feature.option
        )));
      };
      if !decl.values.iter().all(|v| matches!(v, OptionValue::Bool(_))) {
        return Err(TableError::Invalid(format!(
          "feature option '{}' must be boolean",
          feature.option
        )));
      }
      if feature.define.trim().is_empty() {
        return Err(TableError::Invalid(format!(
          "feature for option '{}' has an empty define",
          feature.option
        )));
      }
    }

    if let Some(shared) = self.options.iter().find(|d| d.name == "shared") {
      if !shared.values.iter().all(|v| matches!(v, OptionValue::Bool(_))) {
        return Err(TableError::Invalid("option 'shared' must be boolean".to_string()));
      }
    }

    for rule in &self.artifacts {
      Pattern::new(&rule.pattern)
        .map_err(|e| TableError::Invalid(format!("artifact pattern '{}': {}", rule.pattern, e)))?;
    }
    Ok(())
  }

  /// Whether the recipe declares a `shared` link-mode option.
  pub fn has_shared_option(&self) -> bool {
    self.options.iter().any(|d| d.name == "shared")
  }
}
