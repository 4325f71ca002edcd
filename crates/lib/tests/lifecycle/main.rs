//! End-to-end lifecycle tests with fake collaborators.

mod common;
mod create_tests;
mod lua_recipe_tests;
mod resolution_tests;
