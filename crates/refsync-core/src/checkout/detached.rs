//! Detached HEAD checkout shared by the tag, commit and semver strategies.

use git2::build::CheckoutBuilder;
use git2::{Commit, Oid, Repository};

use crate::error::{CheckoutError, GitContext};

/// Resolve a short name (tag, branch or other ref) and check out the commit it
/// designates with a detached HEAD.
pub(super) fn checkout_detached_dwim<'repo>(
    repo: &'repo Repository,
    name: &str,
) -> Result<Commit<'repo>, CheckoutError> {
    let reference = repo
        .resolve_reference_from_short_name(name)
        .git_context("find", name)?;
    let ref_name = String::from_utf8_lossy(reference.name_bytes()).into_owned();
    let commit = reference
        .peel_to_commit()
        .git_context("get commit for ref", ref_name)?;
    checkout_detached_head(repo, commit.id())
}

/// Point HEAD directly at `oid` and force the working tree to match it.
///
/// Local modifications are discarded.
pub(super) fn checkout_detached_head(
    repo: &Repository,
    oid: Oid,
) -> Result<Commit<'_>, CheckoutError> {
    let commit = repo
        .find_commit(oid)
        .git_context("find git commit", oid.to_string())?;
    repo.set_head_detached(commit.id())
        .git_context("detach HEAD at", oid.to_string())?;

    let mut builder = CheckoutBuilder::new();
    builder.force();
    repo.checkout_head(Some(&mut builder))
        .git_context("checkout HEAD at", oid.to_string())?;
    Ok(commit)
}
