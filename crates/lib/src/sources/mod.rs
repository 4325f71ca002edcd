//! Source export: listing, merging and staging the files of a checkout.
//!
//! # Submodules
//!
//! - [`vcs`] - the two VCS listings and their parsers
//! - [`merge`] - the order-stable file-set merger
//! - [`stage`] - copying the canonical file set into an export directory

pub mod merge;
pub mod stage;
pub mod vcs;

pub use merge::{Listing, merge_listings};
pub use stage::{StageError, StagedSources, stage_sources};
pub use vcs::{GitLister, VcsError, VcsLister, list_sources};

/// List and merge the files to export: modified tracked files first, then
/// the committed tree.
pub fn canonical_file_set(lister: &dyn VcsLister) -> Result<Vec<String>, VcsError> {
  let (status, tree) = list_sources(lister)?;
  Ok(merge_listings(vec![status, tree]))
}
