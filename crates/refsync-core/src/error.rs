//! Error types for checkout operations.

use thiserror::Error;

/// Errors that can occur while resolving and checking out a revision.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CheckoutError {
    #[error("can't checkout with an empty set of auth options")]
    MissingAuthOptions,

    #[error("can't checkout without a valid transport id")]
    MissingTransportId,

    #[error("transport session '{0}' is already registered")]
    SessionInUse(String),

    #[error("could not create oid for '{commit}': {reason}")]
    InvalidCommit { commit: String, reason: String },

    #[error("semver parse error for '{constraint}': {source}")]
    InvalidConstraint {
        constraint: String,
        #[source]
        source: semver::Error,
    },

    /// A libgit2 failure, wrapped with what was attempted and against what.
    #[error("unable to {action} '{target}': {source}")]
    Git {
        action: &'static str,
        target: String,
        #[source]
        source: git2::Error,
    },

    #[error("could not lookup '{tag}' as simple or annotated tag: {source}")]
    TagLookup {
        tag: String,
        #[source]
        source: git2::Error,
    },

    #[error("no match found for semver: {constraint}")]
    NoMatch { constraint: String },

    #[error("cancelled while trying to {action} '{target}'")]
    Cancelled { action: &'static str, target: String },

    #[error("recovered from git engine panic: {0}")]
    Panicked(String),
}

impl CheckoutError {
    /// Whether the failure was caused by the caller's input rather than by the
    /// remote or the local repository. Input errors never succeed on retry.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CheckoutError::MissingAuthOptions
                | CheckoutError::MissingTransportId
                | CheckoutError::SessionInUse(_)
                | CheckoutError::InvalidCommit { .. }
                | CheckoutError::InvalidConstraint { .. }
        )
    }
}

/// Attach checkout context to raw git2 results.
pub(crate) trait GitContext<T> {
    fn git_context(self, action: &'static str, target: impl Into<String>)
    -> Result<T, CheckoutError>;
}

impl<T> GitContext<T> for Result<T, git2::Error> {
    fn git_context(
        self,
        action: &'static str,
        target: impl Into<String>,
    ) -> Result<T, CheckoutError> {
        self.map_err(|source| CheckoutError::Git {
            action,
            target: target.into(),
            source,
        })
    }
}
