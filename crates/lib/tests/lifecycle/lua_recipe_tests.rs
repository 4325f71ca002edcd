use dbrecipe_lib::recipe::lua::load_table;
use dbrecipe_lib::recipe::{Recipe, RecipeTable, TableRecipe};
use tempfile::TempDir;

use super::common::{FakeCmake, lister, pairs};

const RECIPE: &str = r#"
  local rules = recipe.default_artifacts
  table.insert(rules, { pattern = "*.pc", dst = "lib/pkgconfig", flatten = true })

  return {
    metadata = {
      name = "dbcpp",
      license = "BSD-2-Clause",
      description = "Unified Database abstraction for C++",
      topics = { "database" },
    },
    settings = { "os", "compiler", "build_type", "arch" },
    options = {
      { name = "shared", values = { true, false }, default = true },
      { name = "with_pq", values = { true, false }, default = true },
      { name = "with_sqlite3", values = { true, false }, default = true },
    },
    requires = {
      "boost/1.68.0@conan/stable",
      "spdlog/1.3.0@bincrafters/stable",
      "cppuri/1.0.0@tcsantanello/stable",
    },
    features = {
      { option = "with_pq", requires = "libpq/11.5@bincrafters/stable", define = "POSTGRESQL_ENABLE" },
      { option = "with_sqlite3", requires = "sqlite3/3.29.0@bincrafters/stable", define = "SQLITE3_ENABLE" },
    },
    artifacts = rules,
  }
"#;

fn load() -> RecipeTable {
  let temp = TempDir::new().unwrap();
  let path = temp.path().join("recipe.lua");
  std::fs::write(&path, RECIPE).unwrap();
  load_table(&path).unwrap()
}

#[test]
fn lua_table_matches_builtin_resolution() {
  let builtin = RecipeTable::dbcpp();
  let loaded = load();

  assert_eq!(loaded.options, builtin.options);
  assert_eq!(loaded.requires, builtin.requires);
  assert_eq!(loaded.features, builtin.features);
  assert_eq!(loaded.artifacts.len(), builtin.artifacts.len() + 1);
}

#[test]
fn lua_recipe_drives_the_lifecycle() {
  let recipe = TableRecipe::new(load(), Box::new(lister()), Box::new(FakeCmake::default())).unwrap();
  let config = recipe.configure(&pairs(&[("with_pq", "false")]), &[]).unwrap();

  let requirements = recipe.requirements(&config).unwrap();

  assert!(!requirements.contains("libpq"));
  assert!(requirements.contains("sqlite3"));
  assert_eq!(recipe.metadata().topics, vec!["database"]);
}
