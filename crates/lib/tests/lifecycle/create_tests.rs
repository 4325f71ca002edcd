use std::fs;

use dbrecipe_lib::consts::MANIFEST_FILE;
use dbrecipe_lib::recipe::{LocalHost, Recipe};
use tempfile::TempDir;

use super::common::{FakeCmake, checkout, dbcpp_recipe, pairs};

#[test]
fn create_assembles_headers_and_library_chain() {
  let src = TempDir::new().unwrap();
  let out = TempDir::new().unwrap();
  checkout(src.path());
  let driver = FakeCmake::default();
  let recipe = dbcpp_recipe(driver.clone());
  let config = recipe.configure(&pairs(&[("with_sqlite3", "False")]), &[]).unwrap();
  let host = LocalHost::new(src.path(), out.path());

  let report = host.create(&recipe, &config).unwrap();

  assert_eq!(
    report.export.staged,
    vec![
      "src/postgres.cpp",
      "CMakeLists.txt",
      "include/dbc++/dbc++.hpp",
      "include/dbc++/driver.h",
      "src/dbc++.cpp"
    ]
  );

  let package = host.package_dir();
  assert!(package.join("include/dbc++/dbc++.hpp").is_file());
  assert!(package.join("include/dbc++/driver.h").is_file());
  assert!(!package.join("src").exists());

  let lib = package.join("lib");
  assert!(fs::symlink_metadata(lib.join("libdbcpp.so")).unwrap().file_type().is_symlink());
  assert_eq!(fs::read_to_string(lib.join("libdbcpp.so")).unwrap(), "elf");
  assert_eq!(report.info.libs, vec!["dbcpp"]);

  let requests = driver.requests.borrow();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].definitions.get("POSTGRESQL_ENABLE").map(String::as_str), Some("ON"));
  assert!(!requests[0].definitions.contains_key("SQLITE3_ENABLE"));
}

#[test]
fn exports_are_reproducible() {
  let src = TempDir::new().unwrap();
  checkout(src.path());
  let recipe = dbcpp_recipe(FakeCmake::default());
  let config = recipe.configure(&[], &[]).unwrap();

  let first = TempDir::new().unwrap();
  let second = TempDir::new().unwrap();
  LocalHost::new(src.path(), first.path()).export(&recipe, &config).unwrap();
  LocalHost::new(src.path(), second.path()).export(&recipe, &config).unwrap();

  let read = |dir: &TempDir| fs::read_to_string(dir.path().join("export").join(MANIFEST_FILE)).unwrap();
  assert_eq!(read(&first), read(&second));
  assert!(read(&first).contains("src/postgres.cpp: "));
}

#[test]
fn package_stage_reuses_recorded_build() {
  let src = TempDir::new().unwrap();
  let out = TempDir::new().unwrap();
  checkout(src.path());
  let recipe = dbcpp_recipe(FakeCmake::default());
  let config = recipe.configure(&[], &[]).unwrap();
  let host = LocalHost::new(src.path(), out.path());

  host.export(&recipe, &config).unwrap();
  host.build(&recipe, &config).unwrap();
  let build = host.last_build().unwrap();
  let report = host.package(&recipe, &config, &build).unwrap();

  assert_eq!(build.definitions.get("BUILD_SHARED_LIBS").map(String::as_str), Some("ON"));
  assert!(report.copied.iter().any(|c| c.dest == "lib/libdbcpp.so.1.0"));
  assert!(report.manifest.ends_with(MANIFEST_FILE));
  assert_eq!(recipe.package_info(&host.package_dir()).unwrap().libs, vec!["dbcpp"]);
}
