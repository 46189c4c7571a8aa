//! Branch checkout.

use std::path::Path;

use git2::build::CheckoutBuilder;
use git2::{AutotagOption, BranchType, Commit, ErrorCode, Repository};
use tracing::{debug, info};

use super::Checkout;
use crate::error::{CheckoutError, GitContext};
use crate::git::{
    DEFAULT_REMOTE_NAME, ResolvedCommit, branch_filter, connect_and_list, ensure_remote,
    fetch_refspec, initialize_repository, matching_ref,
};
use crate::transport::AuthOptions;

impl Checkout {
    /// Check out the head of `branch`, leaving HEAD on a local branch of the
    /// same name.
    pub(super) fn checkout_branch(
        &self,
        path: &Path,
        url: &str,
        auth: Option<&AuthOptions>,
        branch: &str,
        last_revision: Option<&str>,
    ) -> Result<ResolvedCommit, CheckoutError> {
        let session = self.open_session(url, auth)?;
        let repo = initialize_repository(path, &session)?;
        let mut remote = ensure_remote(&repo, &session)?;
        let reference = format!("refs/heads/{}", branch);

        let filter = last_revision.map(|_| branch_filter(branch));
        let heads = connect_and_list(&mut remote, &session, filter.as_deref())?;
        if let Some(last_revision) = last_revision
            && let Some(head) = matching_ref(&heads, branch, last_revision)
        {
            info!(branch, revision = last_revision, "remote branch unchanged, skipping fetch");
            return Ok(ResolvedCommit::partial(&head.commit_id, reference));
        }

        let refspec = format!("+refs/heads/{0}:refs/remotes/{1}/{0}", branch, DEFAULT_REMOTE_NAME);
        fetch_refspec(&mut remote, &session, &refspec, AutotagOption::None)?;

        let upstream = repo
            .find_reference(&format!("refs/remotes/{}/{}", DEFAULT_REMOTE_NAME, branch))
            .git_context("lookup branch", branch)?;
        let upstream_commit = upstream
            .peel_to_commit()
            .git_context("lookup commit for branch", branch)?;

        update_local_branch(&repo, branch, &upstream_commit)?;

        let tree = upstream_commit
            .tree()
            .git_context("lookup tree for branch", branch)?;
        let mut builder = CheckoutBuilder::new();
        builder.force();
        repo.checkout_tree(tree.as_object(), Some(&mut builder))
            .git_context("checkout tree for branch", branch)?;

        repo.set_head(&reference)
            .git_context("set HEAD to branch", branch)?;
        let head = repo.head().git_context("resolve HEAD for branch", branch)?;
        let commit = head
            .peel_to_commit()
            .git_context("lookup HEAD commit for branch", branch)?;

        Ok(ResolvedCommit::from_commit(&repo, &commit, &reference))
    }
}

/// Make the local branch point at `commit`, creating it if absent.
///
/// An existing local branch is moved even if it diverged; the remote wins.
fn update_local_branch(
    repo: &Repository,
    branch: &str,
    commit: &Commit<'_>,
) -> Result<(), CheckoutError> {
    match repo.find_branch(branch, BranchType::Local) {
        Ok(mut local) => {
            if local.get().target() != Some(commit.id()) {
                debug!(branch, commit = %commit.id(), "moving local branch");
                local
                    .get_mut()
                    .set_target(commit.id(), "refsync: reset to remote head")
                    .git_context("update local branch", branch)?;
            }
            Ok(())
        }
        Err(err) if err.code() == ErrorCode::NotFound => {
            repo.branch(branch, commit, false)
                .git_context("create local branch", branch)?;
            Ok(())
        }
        Err(source) => Err(CheckoutError::Git {
            action: "lookup local branch",
            target: branch.to_string(),
            source,
        }),
    }
}
