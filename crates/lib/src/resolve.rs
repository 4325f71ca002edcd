//! Option resolution: configuration bundle to requirements and definitions.
//!
//! The mapping is data, not branching logic. Each [`Feature`] ties one
//! boolean option to the dependency it pulls in and the build definition
//! that switches the matching backend on. Resolution walks the always
//! required references, then the features in table order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::DEFINITION_ON;
use crate::options::{ConfigBundle, OptionError};
use crate::requirements::{Reference, RequirementError, Requirements};

/// Definition key to value, handed to the build driver.
pub type BuildDefinitions = BTreeMap<String, String>;

/// Errors raised during option resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
  #[error(transparent)]
  Option(#[from] OptionError),

  #[error(transparent)]
  Requirement(#[from] RequirementError),
}

/// An optional dependency controlled by a boolean option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
  /// The option that enables it, e.g. `with_pq`.
  pub option: String,
  /// The dependency required when enabled.
  pub requires: Reference,
  /// Uppercase feature flag set to `ON` when enabled, e.g. `POSTGRESQL_ENABLE`.
  pub define: String,
}

/// Requirements and feature definitions for one bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
  pub requirements: Requirements,
  pub definitions: BuildDefinitions,
}

/// Every always-required reference, then one per enabled feature.
pub fn resolve_requirements(
  required: &[Reference],
  features: &[Feature],
  config: &ConfigBundle,
) -> Result<Requirements, ResolveError> {
  let mut requirements = Requirements::new();
  for reference in required {
    requirements.add(reference.clone())?;
  }
  for feature in features {
    if config.flag(&feature.option)? {
      debug!(option = %feature.option, reference = %feature.requires, "feature requirement");
      requirements.add(feature.requires.clone())?;
    }
  }
  Ok(requirements)
}

/// One `ON` definition per enabled feature.
pub fn resolve_definitions(features: &[Feature], config: &ConfigBundle) -> Result<BuildDefinitions, ResolveError> {
  let mut definitions = BuildDefinitions::new();
  for feature in features {
    if config.flag(&feature.option)? {
      definitions.insert(feature.define.clone(), DEFINITION_ON.to_string());
    }
  }
  Ok(definitions)
}

/// Resolve both halves at once.
pub fn resolve(required: &[Reference], features: &[Feature], config: &ConfigBundle) -> Result<Resolution, ResolveError> {
  Ok(Resolution {
    requirements: resolve_requirements(required, features, config)?,
    definitions: resolve_definitions(features, config)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::options::{OptionValue, Settings};

  fn required() -> Vec<Reference> {
    ["boost/1.68.0@conan/stable", "spdlog/1.3.0@bincrafters/stable"]
      .iter()
      .map(|r| r.parse().unwrap())
      .collect()
  }

  fn features() -> Vec<Feature> {
    vec![
      Feature {
        option: "with_pq".to_string(),
        requires: "libpq/11.5@bincrafters/stable".parse().unwrap(),
        define: "POSTGRESQL_ENABLE".to_string(),
      },
      Feature {
        option: "with_sqlite3".to_string(),
        requires: "sqlite3/3.29.0@bincrafters/stable".parse().unwrap(),
        define: "SQLITE3_ENABLE".to_string(),
      },
    ]
  }

  fn bundle(pq: bool, sqlite: bool) -> ConfigBundle {
    let options = BTreeMap::from([
      ("with_pq".to_string(), OptionValue::Bool(pq)),
      ("with_sqlite3".to_string(), OptionValue::Bool(sqlite)),
    ]);
    ConfigBundle::new(options, Settings::default())
  }

  fn names(reqs: &Requirements) -> Vec<&str> {
    reqs.iter().map(|r| r.name.as_str()).collect()
  }

  #[test]
  fn pq_only_adds_pq_requirement_and_definition() {
    let resolution = resolve(&required(), &features(), &bundle(true, false)).unwrap();

    assert_eq!(names(&resolution.requirements), vec!["boost", "spdlog", "libpq"]);
    assert_eq!(
      resolution.definitions,
      BuildDefinitions::from([("POSTGRESQL_ENABLE".to_string(), "ON".to_string())])
    );
    assert!(!resolution.requirements.contains("sqlite3"));
  }

  #[test]
  fn nothing_enabled_gives_only_required() {
    let resolution = resolve(&required(), &features(), &bundle(false, false)).unwrap();

    assert_eq!(names(&resolution.requirements), vec!["boost", "spdlog"]);
    assert!(resolution.definitions.is_empty());
  }

  #[test]
  fn everything_enabled_follows_table_order() {
    let resolution = resolve(&required(), &features(), &bundle(true, true)).unwrap();

    assert_eq!(names(&resolution.requirements), vec!["boost", "spdlog", "libpq", "sqlite3"]);
    assert_eq!(resolution.definitions.len(), 2);
    assert_eq!(resolution.definitions["SQLITE3_ENABLE"], "ON");
  }

  #[test]
  fn feature_duplicating_a_required_dependency_is_added_once() {
    let mut features = features();
    features.push(Feature {
      option: "with_pq".to_string(),
      requires: "boost/1.68.0@conan/stable".parse().unwrap(),
      define: "BOOST_EXTRAS".to_string(),
    });

    let reqs = resolve_requirements(&required(), &features, &bundle(true, false)).unwrap();

    assert_eq!(names(&reqs), vec!["boost", "spdlog", "libpq"]);
  }

  #[test]
  fn missing_option_fails_fast() {
    let options = BTreeMap::from([("with_pq".to_string(), OptionValue::Bool(true))]);
    let config = ConfigBundle::new(options, Settings::default());

    let err = resolve(&required(), &features(), &config).unwrap_err();

    assert_eq!(err, ResolveError::Option(OptionError::MissingValue("with_sqlite3".to_string())));
  }

  #[test]
  fn non_boolean_option_fails_fast() {
    let options = BTreeMap::from([
      ("with_pq".to_string(), OptionValue::from("yes please")),
      ("with_sqlite3".to_string(), OptionValue::Bool(false)),
    ]);
    let config = ConfigBundle::new(options, Settings::default());

    assert!(matches!(
      resolve_definitions(&features(), &config),
      Err(ResolveError::Option(OptionError::NotBoolean { .. }))
    ));
  }
}
