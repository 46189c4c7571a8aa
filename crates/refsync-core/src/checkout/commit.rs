//! Exact commit checkout.

use std::path::Path;

use git2::{AutotagOption, Oid};

use super::Checkout;
use super::detached::checkout_detached_head;
use crate::error::CheckoutError;
use crate::git::{ResolvedCommit, ensure_remote, fetch_all, initialize_repository};
use crate::transport::AuthOptions;

/// Length of a full hex SHA-1 object id.
const OID_HEX_LEN: usize = 40;

/// Parse a full hexadecimal commit id.
///
/// Abbreviated ids are rejected: a checkout by commit must name exactly one
/// object without consulting the remote.
pub fn parse_commit_id(id: &str) -> Result<Oid, CheckoutError> {
    let invalid = |reason: &str| CheckoutError::InvalidCommit {
        commit: id.to_string(),
        reason: reason.to_string(),
    };

    if id.len() != OID_HEX_LEN {
        return Err(invalid("expected a 40 character hex object id"));
    }
    if !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("not a hex object id"));
    }
    Oid::from_str(id).map_err(|err| invalid(err.message()))
}

impl Checkout {
    /// Check out commit `id` with a detached HEAD.
    pub(super) fn checkout_commit(
        &self,
        path: &Path,
        url: &str,
        auth: Option<&AuthOptions>,
        id: &str,
    ) -> Result<ResolvedCommit, CheckoutError> {
        let oid = parse_commit_id(id)?;

        let session = self.open_session(url, auth)?;
        let repo = initialize_repository(path, &session)?;
        let mut remote = ensure_remote(&repo, &session)?;
        fetch_all(&mut remote, &session, AutotagOption::None)?;

        let commit = checkout_detached_head(&repo, oid)?;
        Ok(ResolvedCommit::from_commit(&repo, &commit, ""))
    }
}
