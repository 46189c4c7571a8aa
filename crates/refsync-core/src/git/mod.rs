//! Git building blocks used by the checkout strategies.
//!
//! This module provides:
//! - Repository initialisation with a single `origin` remote
//! - Remote listing and the revision short-circuit
//! - The tag catalog used for semantic version resolution
//! - Projection of commits into [`ResolvedCommit`]

mod commit;
mod repository;
mod revision;
mod tags;

pub use commit::{ResolvedCommit, Signature};
pub use repository::{DEFAULT_REMOTE_NAME, ensure_remote, initialize_repository};
pub use revision::{RemoteRef, format_revision, matching_ref};
pub use tags::{TagCatalog, TagEntry};

pub(crate) use repository::{fetch_all, fetch_refspec, mirror_tags};
pub(crate) use revision::{branch_filter, connect_and_list, tag_filter};

#[cfg(test)]
mod tests;
