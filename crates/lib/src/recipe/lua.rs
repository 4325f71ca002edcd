//! Loading recipe tables from Lua.
//!
//! A recipe file is a Lua chunk returning a table shaped like
//! [`RecipeTable`]. Before the chunk runs a `recipe` global is registered:
//!
//! - `recipe.os` - host OS as used in settings (e.g. `"Linux"`)
//! - `recipe.arch` - host architecture (e.g. `"x86_64"`)
//! - `recipe.default_artifacts` - the default artifact rule list
//!
//! ```lua
//! return {
//!   metadata = { name = "dbcpp", license = "BSD-2-Clause" },
//!   settings = { "os", "compiler", "build_type", "arch" },
//!   options = {
//!     { name = "with_pq", values = { true, false }, default = recipe.os ~= "Windows" },
//!   },
//!   requires = { "boost/1.68.0@conan/stable" },
//!   features = {
//!     { option = "with_pq", requires = "libpq/11.5@bincrafters/stable", define = "POSTGRESQL_ENABLE" },
//!   },
//! }
//! ```

use std::path::Path;

use mlua::prelude::*;
use tracing::{debug, info};

use crate::package::default_rules;
use crate::platform::Platform;
use crate::recipe::table::{RecipeTable, TableError};

/// Create a Lua state with the `recipe` global registered.
pub fn create_runtime() -> LuaResult<Lua> {
  let lua = Lua::new();
  let recipe = lua.create_table()?;

  if let Some(platform) = Platform::current() {
    recipe.set("os", platform.os.to_string())?;
    recipe.set("arch", platform.arch.to_string())?;
  }
  recipe.set("default_artifacts", lua.to_value(&default_rules())?)?;

  lua.globals().set("recipe", recipe)?;
  Ok(lua)
}

/// Evaluate `source` (named `chunk_name` in error messages) into a validated table.
pub fn load_table_str(source: &str, chunk_name: &str) -> Result<RecipeTable, TableError> {
  let lua = create_runtime()?;
  let value = lua.load(source).set_name(format!("@{}", chunk_name)).eval::<LuaValue>()?;

  if !matches!(value, LuaValue::Table(_)) {
    return Err(TableError::NotATable(chunk_name.to_string()));
  }

  let table: RecipeTable = lua.from_value(value)?;
  table.validate()?;
  debug!(recipe = %table.metadata.name, options = table.options.len(), "recipe table loaded");
  Ok(table)
}

/// Read and evaluate a recipe file.
pub fn load_table(path: &Path) -> Result<RecipeTable, TableError> {
  info!(path = ?path, "loading recipe");
  let content = std::fs::read_to_string(path).map_err(|source| TableError::Read {
    path: path.display().to_string(),
    source,
  })?;
  load_table_str(&content, &path.display().to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::options::OptionValue;
  use crate::package::ArtifactRule;
  use tempfile::TempDir;

  const DBCPP_LUA: &str = r#"
    return {
      metadata = {
        name = "dbcpp",
        license = "BSD-2-Clause",
        topics = { "database" },
      },
      settings = { "os", "compiler", "build_type", "arch" },
      options = {
        { name = "shared", values = { true, false }, default = true },
        { name = "with_pq", values = { true, false }, default = true },
        { name = "with_sqlite3", values = { true, false }, default = false },
      },
      requires = {
        "boost/1.68.0@conan/stable",
        "spdlog/1.3.0@bincrafters/stable",
      },
      features = {
        { option = "with_pq", requires = "libpq/11.5@bincrafters/stable", define = "POSTGRESQL_ENABLE" },
        { option = "with_sqlite3", requires = "sqlite3/3.29.0@bincrafters/stable", define = "SQLITE3_ENABLE" },
      },
    }
  "#;

  #[test]
  fn loads_table_in_declared_order() {
    let table = load_table_str(DBCPP_LUA, "recipe.lua").unwrap();

    assert_eq!(table.metadata.name, "dbcpp");
    assert_eq!(table.metadata.topics, vec!["database"]);
    assert_eq!(table.options[2].default, Some(OptionValue::Bool(false)));
    assert_eq!(table.requires[1].to_string(), "spdlog/1.3.0@bincrafters/stable");
    assert_eq!(table.features[0].define, "POSTGRESQL_ENABLE");
    assert_eq!(table.artifacts, default_rules());
  }

  #[test]
  fn recipe_global_exposes_platform() {
    let source = r#"
      return {
        metadata = { name = "probe", description = recipe.os .. "/" .. recipe.arch },
      }
    "#;
    let table = load_table_str(source, "probe.lua").unwrap();
    let expected = Platform::current().unwrap().to_string().replace('-', "/");

    assert_eq!(table.metadata.description.as_deref(), Some(expected.as_str()));
  }

  #[test]
  fn default_artifacts_can_be_extended() {
    let source = r#"
      local rules = recipe.default_artifacts
      table.insert(rules, { pattern = "*.pc", dst = "lib/pkgconfig", flatten = true })
      return { metadata = { name = "ext" }, artifacts = rules }
    "#;
    let table = load_table_str(source, "ext.lua").unwrap();

    assert_eq!(table.artifacts.len(), default_rules().len() + 1);
    assert_eq!(table.artifacts.last(), Some(&ArtifactRule::flat("*.pc", "lib/pkgconfig")));
  }

  #[test]
  fn non_table_result_is_rejected() {
    let err = load_table_str("return 42", "bad.lua").unwrap_err();
    assert!(matches!(err, TableError::NotATable(_)));
  }

  #[test]
  fn syntax_error_surfaces_as_lua_error() {
    let err = load_table_str("return {", "broken.lua").unwrap_err();
    assert!(matches!(err, TableError::Lua(_)));
  }

  #[test]
  fn malformed_reference_fails_to_load() {
    let source = r#"return { metadata = { name = "x" }, requires = { "boost" } }"#;
    assert!(load_table_str(source, "x.lua").is_err());
  }

  #[test]
  fn invalid_default_fails_validation() {
    let source = r#"
      return {
        metadata = { name = "x" },
        options = { { name = "shared", values = { true, false }, default = "static" } },
      }
    "#;
    let err = load_table_str(source, "x.lua").unwrap_err();
    assert!(matches!(err, TableError::Option(_)));
  }

  #[test]
  fn load_table_reads_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("recipe.lua");
    std::fs::write(&path, DBCPP_LUA).unwrap();

    let table = load_table(&path).unwrap();
    assert_eq!(table.options.len(), 3);
  }

  #[test]
  fn missing_file_is_read_error() {
    let temp = TempDir::new().unwrap();
    let err = load_table(&temp.path().join("nope.lua")).unwrap_err();
    assert!(matches!(err, TableError::Read { .. }));
  }
}
