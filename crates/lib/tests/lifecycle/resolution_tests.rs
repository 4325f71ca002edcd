use dbrecipe_lib::options::OptionError;
use dbrecipe_lib::recipe::{ErrorKind, Recipe, RecipeError};
use dbrecipe_lib::sources::merge_listings;

use super::common::{FakeCmake, dbcpp_recipe, pairs};

fn requirement_names(options: &[(&str, &str)]) -> Vec<String> {
  let recipe = dbcpp_recipe(FakeCmake::default());
  let config = recipe.configure(&pairs(options), &[]).unwrap();
  recipe
    .requirements(&config)
    .unwrap()
    .iter()
    .map(|r| r.to_string())
    .collect()
}

#[test]
fn postgres_only() {
  assert_eq!(
    requirement_names(&[("with_pq", "True"), ("with_sqlite3", "False")]),
    vec![
      "boost/1.68.0@conan/stable",
      "spdlog/1.3.0@bincrafters/stable",
      "cppuri/1.0.0@tcsantanello/stable",
      "libpq/11.5@bincrafters/stable",
    ]
  );
}

#[test]
fn no_backends() {
  assert_eq!(
    requirement_names(&[("with_pq", "False"), ("with_sqlite3", "False")]).len(),
    3
  );
}

#[test]
fn defaults_enable_both_backends() {
  let names = requirement_names(&[]);
  assert_eq!(names.len(), 5);
  assert_eq!(names[4], "sqlite3/3.29.0@bincrafters/stable");
}

#[test]
fn bad_option_value_is_a_configuration_error() {
  let recipe = dbcpp_recipe(FakeCmake::default());
  let err = recipe.configure(&pairs(&[("with_pq", "yes")]), &[]).unwrap_err();

  assert!(matches!(err, RecipeError::Option(OptionError::InvalidValue { .. })));
  assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn settings_are_carried_not_interpreted() {
  let recipe = dbcpp_recipe(FakeCmake::default());
  let config = recipe
    .configure(&[], &pairs(&[("compiler", "gcc"), ("build_type", "Debug")]))
    .unwrap();

  assert_eq!(config.setting("compiler"), Some("gcc"));
  assert_eq!(config.setting("build_type"), Some("Debug"));
  assert!(recipe.configure(&[], &pairs(&[("cppstd", "17")])).is_err());
}

#[test]
fn merge_of_listing_with_itself_is_dedup() {
  let listing = vec!["a.cpp", "b.cpp", "a.cpp", "c.cpp"];
  assert_eq!(
    merge_listings(vec![listing.clone(), listing]),
    vec!["a.cpp", "b.cpp", "c.cpp"]
  );
}
