use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use dbrecipe_lib::build::{BuildDriver, BuildError, BuildRequest};
use dbrecipe_lib::recipe::{RecipeTable, TableRecipe};
use dbrecipe_lib::sources::{VcsError, VcsLister};

/// Serves fixed `git status -s` and `git ls-tree` output.
pub struct CannedLister {
  pub status: String,
  pub tree: String,
}

impl VcsLister for CannedLister {
  fn modified_files(&self) -> Result<String, VcsError> {
    Ok(self.status.clone())
  }

  fn tree_files(&self) -> Result<String, VcsError> {
    Ok(self.tree.clone())
  }
}

/// Records every request and writes a fake shared-library chain on build.
#[derive(Default, Clone)]
pub struct FakeCmake {
  pub requests: Rc<RefCell<Vec<BuildRequest>>>,
}

impl BuildDriver for FakeCmake {
  fn configure(&self, request: &BuildRequest) -> Result<(), BuildError> {
    self.requests.borrow_mut().push(request.clone());
    Ok(())
  }

  fn build(&self, request: &BuildRequest) -> Result<(), BuildError> {
    let out = request.layout.build_dir.join("lib");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("libdbcpp.so.1.0"), "elf").unwrap();
    symlink("libdbcpp.so.1.0", &out.join("libdbcpp.so.1"));
    symlink("libdbcpp.so.1", &out.join("libdbcpp.so"));
    Ok(())
  }
}

pub fn symlink(target: &str, link: &Path) {
  #[cfg(unix)]
  std::os::unix::fs::symlink(target, link).unwrap();
  #[cfg(windows)]
  std::os::windows::fs::symlink_file(target, link).unwrap();
}

pub fn write_file(root: &Path, rel: &str, content: &str) {
  let path = root.join(rel);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

/// A small dbcpp-like checkout.
pub fn checkout(root: &Path) {
  write_file(root, "CMakeLists.txt", "project(dbcpp CXX)");
  write_file(root, "include/dbc++/dbc++.hpp", "#pragma once");
  write_file(root, "include/dbc++/driver.h", "#pragma once");
  write_file(root, "src/dbc++.cpp", "// impl");
  write_file(root, "src/postgres.cpp", "// pq");
}

pub fn lister() -> CannedLister {
  CannedLister {
    status: " M src/postgres.cpp\n".to_string(),
    tree: "CMakeLists.txt\ninclude/dbc++/dbc++.hpp\ninclude/dbc++/driver.h\nsrc/dbc++.cpp\nsrc/postgres.cpp\n"
      .to_string(),
  }
}

pub fn dbcpp_recipe(driver: FakeCmake) -> TableRecipe {
  TableRecipe::new(RecipeTable::dbcpp(), Box::new(lister()), Box::new(driver)).unwrap()
}

pub fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
  items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
