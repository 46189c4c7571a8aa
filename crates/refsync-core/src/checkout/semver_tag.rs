//! Semantic version checkout.

use std::path::Path;

use tracing::info;

use super::Checkout;
use super::detached::checkout_detached_dwim;
use crate::error::CheckoutError;
use crate::git::{ResolvedCommit, TagCatalog, ensure_remote, initialize_repository, mirror_tags};
use crate::transport::AuthOptions;
use crate::version::{SemverConstraint, select_latest};

impl Checkout {
    /// Check out the newest tag satisfying `constraint` with a detached HEAD.
    pub(super) fn checkout_semver(
        &self,
        path: &Path,
        url: &str,
        auth: Option<&AuthOptions>,
        constraint: &str,
    ) -> Result<ResolvedCommit, CheckoutError> {
        let constraint = SemverConstraint::parse(constraint)?;

        let session = self.open_session(url, auth)?;
        let repo = initialize_repository(path, &session)?;
        let mut remote = ensure_remote(&repo, &session)?;
        mirror_tags(&repo, &mut remote, &session)?;

        let catalog = TagCatalog::from_repository(&repo)?;
        let winner = select_latest(&catalog, &constraint).ok_or_else(|| CheckoutError::NoMatch {
            constraint: constraint.to_string(),
        })?;
        info!(
            constraint = %constraint,
            tag = %winner.name,
            annotated = winner.annotated,
            "selected tag"
        );

        let commit = checkout_detached_dwim(&repo, &winner.name)?;
        let reference = format!("refs/tags/{}", winner.name);
        Ok(ResolvedCommit::from_commit(&repo, &commit, &reference))
    }
}
