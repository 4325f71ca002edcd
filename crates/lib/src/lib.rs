//! dbrecipe-lib: recipe engine for packaging dbcpp
//!
//! This crate provides the decision logic a package host calls into:
//! - `options`: declared options, settings and the per-invocation bundle
//! - `resolve`: bundle to requirements and build definitions
//! - `sources`: VCS listings merged into the canonical file set
//! - `build`: the CMake build driver
//! - `package`: artifact rules and package assembly
//! - `recipe`: the `Recipe` trait, recipe tables and a local host

pub mod build;
pub mod consts;
pub mod exec;
pub mod options;
pub mod package;
pub mod platform;
pub mod recipe;
pub mod requirements;
pub mod resolve;
pub mod sources;
pub mod util;
