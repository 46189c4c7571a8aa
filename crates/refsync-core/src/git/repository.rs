//! Opening repositories and configuring their remote.

use std::path::Path;

use git2::{AutotagOption, ErrorCode, FetchPrune, Remote, Repository};
use tracing::debug;

use crate::error::{CheckoutError, GitContext};
use crate::transport::TransportSession;

/// Name of the single remote every checkout works through.
pub const DEFAULT_REMOTE_NAME: &str = "origin";

/// Refspec of a full fetch of every branch.
const ALL_BRANCHES_REFSPEC: &str = "+refs/heads/*:refs/remotes/origin/*";

/// Refspec mirroring every tag.
const ALL_TAGS_REFSPEC: &str = "+refs/tags/*:refs/tags/*";

/// Open the repository at `path`, initializing it if absent.
///
/// Never fails because a repository already exists.
pub fn initialize_repository(
    path: &Path,
    session: &TransportSession,
) -> Result<Repository, CheckoutError> {
    Repository::init(path).git_context("init repository for", session.target_url())
}

/// Return the `origin` remote of `repo`, creating it or repointing it at the
/// session's remote url as needed.
///
/// A repointed remote is looked up again so the returned handle reflects the
/// new url.
pub fn ensure_remote<'repo>(
    repo: &'repo Repository,
    session: &TransportSession,
) -> Result<Remote<'repo>, CheckoutError> {
    let url = session.remote_url();
    match repo.remote(DEFAULT_REMOTE_NAME, url) {
        Ok(remote) => Ok(remote),
        Err(err) if err.code() == ErrorCode::Exists => {
            let remote = repo
                .find_remote(DEFAULT_REMOTE_NAME)
                .git_context("lookup remote", DEFAULT_REMOTE_NAME)?;
            if remote.url() == Some(url) {
                return Ok(remote);
            }
            drop(remote);

            debug!(remote = DEFAULT_REMOTE_NAME, url, "repointing remote");
            repo.remote_set_url(DEFAULT_REMOTE_NAME, url)
                .git_context("configure remote origin with url", url)?;
            repo.find_remote(DEFAULT_REMOTE_NAME)
                .git_context("lookup remote", DEFAULT_REMOTE_NAME)
        }
        Err(err) => Err(CheckoutError::Git {
            action: "create remote for",
            target: url.to_string(),
            source: err,
        }),
    }
}

/// Fetch a single refspec from `remote`.
pub(crate) fn fetch_refspec(
    remote: &mut Remote<'_>,
    session: &TransportSession,
    refspec: &str,
    tags: AutotagOption,
) -> Result<(), CheckoutError> {
    debug!(url = session.target_url(), refspec, "fetching");
    let mut options = session.fetch_options(tags);
    remote
        .fetch(&[refspec], Some(&mut options), None)
        .map_err(|err| session.network_error("fetch remote", err))
}

/// Fetch every branch from `remote`, the equivalent of a clone.
pub(crate) fn fetch_all(
    remote: &mut Remote<'_>,
    session: &TransportSession,
    tags: AutotagOption,
) -> Result<(), CheckoutError> {
    debug!(url = session.target_url(), "fetching all branches");
    let mut options = session.fetch_options(tags);
    remote
        .fetch(&[ALL_BRANCHES_REFSPEC], Some(&mut options), None)
        .map_err(|err| session.network_error("clone", err))
}

/// Replace the local tags with the remote's current ones.
///
/// Local `refs/tags/*` are deleted before fetching every branch and tag with
/// pruning, so afterwards they hold exactly what the remote advertises.
pub(crate) fn mirror_tags(
    repo: &Repository,
    remote: &mut Remote<'_>,
    session: &TransportSession,
) -> Result<(), CheckoutError> {
    let removed = remove_local_tags(repo)?;
    debug!(url = session.target_url(), removed, "fetching all branches and tags");

    let mut options = session.fetch_options(AutotagOption::All);
    options.prune(FetchPrune::On);
    remote
        .fetch(
            &[ALL_BRANCHES_REFSPEC, ALL_TAGS_REFSPEC],
            Some(&mut options),
            None,
        )
        .map_err(|err| session.network_error("clone", err))
}

fn remove_local_tags(repo: &Repository) -> Result<usize, CheckoutError> {
    let location = repo.path().display().to_string();
    let names = repo
        .references_glob("refs/tags/*")
        .git_context("list tags of", location.as_str())?
        .map(|reference| {
            reference.map(|reference| String::from_utf8_lossy(reference.name_bytes()).into_owned())
        })
        .collect::<Result<Vec<_>, _>>()
        .git_context("read tag reference in", location.as_str())?;

    for name in &names {
        repo.find_reference(name)
            .and_then(|mut reference| reference.delete())
            .git_context("delete local tag", name.as_str())?;
    }
    Ok(names.len())
}
