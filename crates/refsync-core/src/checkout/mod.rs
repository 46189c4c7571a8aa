//! Checkout strategies.
//!
//! [`Checkout::run`] dispatches a [`CheckoutIntent`] to one of four
//! strategies:
//! - branch: track the remote branch head through a local branch
//! - tag: detached checkout of a tag
//! - commit: detached checkout of an exact commit id
//! - semver: detached checkout of the newest tag matching a constraint
//!
//! Branch and tag checkouts accept the revision marker of the previous run and
//! skip fetching entirely when the remote has not moved.
//!
//! Each run registers a transport session for its duration. The session is
//! released on every exit path, and a panic raised inside a strategy is turned
//! into [`CheckoutError::Panicked`].

mod branch;
mod commit;
mod detached;
mod semver_tag;
mod tag;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::CheckoutError;
use crate::git::ResolvedCommit;
use crate::options::{CheckoutIntent, CheckoutOptions};
use crate::transport::{AuthOptions, Cancellation, SessionGuard, SessionRegistry, TransportSession};

pub use commit::parse_commit_id;

/// Executes checkouts against a session registry.
#[derive(Debug, Clone)]
pub struct Checkout {
    registry: Arc<SessionRegistry>,
    cancellation: Cancellation,
}

impl Default for Checkout {
    fn default() -> Self {
        Self::new()
    }
}

impl Checkout {
    /// A checkout using the process-wide session registry.
    pub fn new() -> Self {
        Self {
            registry: SessionRegistry::global(),
            cancellation: Cancellation::new(),
        }
    }

    /// Use `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: Arc<SessionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Share `cancellation` with every session this checkout opens.
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    /// Resolve `intent` against `url` and check it out into `path`.
    pub fn run(
        &self,
        intent: &CheckoutIntent,
        path: &Path,
        url: &str,
        auth: Option<&AuthOptions>,
    ) -> Result<ResolvedCommit, CheckoutError> {
        info!(kind = intent.kind(), url, path = %path.display(), "starting checkout");

        let result = recover_panic(|| match intent {
            CheckoutIntent::Branch {
                name,
                last_revision,
            } => self.checkout_branch(path, url, auth, name, last_revision.as_deref()),
            CheckoutIntent::Tag {
                name,
                last_revision,
            } => self.checkout_tag(path, url, auth, name, last_revision.as_deref()),
            CheckoutIntent::Commit { id } => self.checkout_commit(path, url, auth, id),
            CheckoutIntent::SemVer { constraint } => {
                self.checkout_semver(path, url, auth, constraint)
            }
        });

        match &result {
            Ok(commit) => info!(kind = intent.kind(), url, revision = %commit, "checkout complete"),
            Err(err) => warn!(kind = intent.kind(), url, error = %err, "checkout failed"),
        }
        result
    }

    /// Resolve `options` into an intent and run it.
    pub fn run_options(
        &self,
        options: &CheckoutOptions,
        path: &Path,
        url: &str,
        auth: Option<&AuthOptions>,
    ) -> Result<ResolvedCommit, CheckoutError> {
        self.run(&options.intent(), path, url, auth)
    }

    /// Register the transport session for one strategy run.
    fn open_session(
        &self,
        url: &str,
        auth: Option<&AuthOptions>,
    ) -> Result<SessionGuard, CheckoutError> {
        let auth = auth.ok_or(CheckoutError::MissingAuthOptions)?;
        let session = TransportSession::new(url, auth.clone())
            .with_cancellation(self.cancellation.clone());
        self.registry.register(session)
    }
}

/// Run `body`, converting a panic into an ordinary error.
///
/// Values owned by `body` are dropped during unwinding, so session guards and
/// git handles are released before the error is returned.
pub(crate) fn recover_panic<T>(
    body: impl FnOnce() -> Result<T, CheckoutError>,
) -> Result<T, CheckoutError> {
    panic::catch_unwind(AssertUnwindSafe(body))
        .unwrap_or_else(|payload| Err(CheckoutError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
