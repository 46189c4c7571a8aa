//! Remote listing and the revision short-circuit.
//!
//! A revision marker has the form `<name>/<commit-hash>`. Callers keep the
//! marker of their last successful checkout and pass it back; when the remote
//! still advertises the same commit for the ref, the checkout can be skipped.
//! Markers are compared by exact string equality only.

use git2::{Direction, Remote};
use tracing::debug;

use crate::error::CheckoutError;
use crate::transport::TransportSession;

/// A ref advertised by the remote, as returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub name: String,
    pub commit_id: String,
}

impl RemoteRef {
    pub fn new(name: impl Into<String>, commit_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_id: commit_id.into(),
        }
    }
}

/// Format the revision marker for `name` at `hash`.
pub fn format_revision(name: &str, hash: &str) -> String {
    format!("{}/{}", name, hash)
}

/// Find the listed ref whose revision marker for `name` equals `last_revision`.
///
/// Refs are tried in listing order. For a tag the listing can hold both the
/// tag object and its peeled commit; either may match.
pub fn matching_ref<'a>(
    refs: &'a [RemoteRef],
    name: &str,
    last_revision: &str,
) -> Option<&'a RemoteRef> {
    refs.iter()
        .find(|r| format_revision(name, &r.commit_id) == last_revision)
}

/// Connect to the remote for fetching and, when `filter` is given, list the
/// advertised refs whose names are in it.
///
/// The connection is closed before returning; no objects are transferred.
pub(crate) fn connect_and_list(
    remote: &mut Remote<'_>,
    session: &TransportSession,
    filter: Option<&[String]>,
) -> Result<Vec<RemoteRef>, CheckoutError> {
    let connection = remote
        .connect_auth(
            Direction::Fetch,
            Some(session.remote_callbacks()),
            Some(session.proxy_options()),
        )
        .map_err(|err| session.network_error("fetch-connect to remote", err))?;

    let Some(filter) = filter else {
        return Ok(Vec::new());
    };

    let heads = connection
        .list()
        .map_err(|err| session.network_error("remote ls for", err))?;
    let refs: Vec<RemoteRef> = heads
        .iter()
        .filter(|head| filter.iter().any(|name| name == head.name()))
        .map(|head| RemoteRef::new(head.name(), head.oid().to_string()))
        .collect();
    debug!(url = session.target_url(), count = refs.len(), "listed remote refs");
    Ok(refs)
}

/// Listing filter for a branch: only its head.
pub(crate) fn branch_filter(branch: &str) -> Vec<String> {
    vec![format!("refs/heads/{}", branch)]
}

/// Listing filter for a tag: the tag itself and its peeled advertisement.
pub(crate) fn tag_filter(tag: &str) -> Vec<String> {
    vec![format!("refs/tags/{}", tag), format!("refs/tags/{}^{{}}", tag)]
}
