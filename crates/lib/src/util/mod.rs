//! Shared utilities.
//!
//! Digest manifests for staged trees and test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
