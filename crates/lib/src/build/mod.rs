//! Build invocation.
//!
//! The recipe never compiles anything itself. It turns the resolved feature
//! definitions and the host's settings into a [`BuildRequest`] and hands it
//! to a [`BuildDriver`], which configures and then builds. Driver failures
//! propagate unchanged; a silently retried build would hide a real compile
//! error.
//!
//! # Submodules
//!
//! - [`cmake`] - the CMake driver

pub mod cmake;
mod types;

pub use cmake::{BuildDriver, CmakeDriver};
pub use types::*;
