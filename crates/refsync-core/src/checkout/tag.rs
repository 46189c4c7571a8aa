//! Tag checkout.

use std::path::Path;

use git2::AutotagOption;
use tracing::info;

use super::Checkout;
use super::detached::checkout_detached_dwim;
use crate::error::CheckoutError;
use crate::git::{
    ResolvedCommit, connect_and_list, ensure_remote, fetch_refspec, initialize_repository,
    matching_ref, tag_filter,
};
use crate::transport::AuthOptions;

impl Checkout {
    /// Check out `tag` with a detached HEAD.
    pub(super) fn checkout_tag(
        &self,
        path: &Path,
        url: &str,
        auth: Option<&AuthOptions>,
        tag: &str,
        last_revision: Option<&str>,
    ) -> Result<ResolvedCommit, CheckoutError> {
        let session = self.open_session(url, auth)?;
        let repo = initialize_repository(path, &session)?;
        let mut remote = ensure_remote(&repo, &session)?;
        let reference = format!("refs/tags/{}", tag);

        // The listing may hold the tag object and its peeled commit.
        let filter = last_revision.map(|_| tag_filter(tag));
        let refs = connect_and_list(&mut remote, &session, filter.as_deref())?;
        if let Some(last_revision) = last_revision
            && let Some(matched) = matching_ref(&refs, tag, last_revision)
        {
            info!(tag, revision = last_revision, "remote tag unchanged, skipping fetch");
            return Ok(ResolvedCommit::partial(&matched.commit_id, reference));
        }

        let refspec = format!("+{0}:{0}", reference);
        fetch_refspec(&mut remote, &session, &refspec, AutotagOption::Auto)?;

        let commit = checkout_detached_dwim(&repo, tag)?;
        Ok(ResolvedCommit::from_commit(&repo, &commit, &reference))
    }
}
