//! Transport session and git2 option construction.

use git2::{AutotagOption, FetchOptions, ProxyOptions, RemoteCallbacks};
use tracing::trace;

use super::{AuthOptions, Cancellation};
use crate::error::CheckoutError;

/// libgit2 asks for credentials again after each rejection; stop after this
/// many attempts instead of looping.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// How remote connections reach the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProxyPolicy {
    /// Use the proxy configured in git config or the environment, if any.
    #[default]
    Auto,
}

/// Everything the transport needs for one checkout of one url.
#[derive(Debug, Clone)]
pub struct TransportSession {
    target_url: String,
    auth: AuthOptions,
    proxy: ProxyPolicy,
    cancellation: Cancellation,
}

impl TransportSession {
    pub fn new(target_url: impl Into<String>, auth: AuthOptions) -> Self {
        Self {
            target_url: target_url.into(),
            auth,
            proxy: ProxyPolicy::Auto,
            cancellation: Cancellation::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// The registry key of this session.
    pub fn id(&self) -> &str {
        &self.auth.transport_id
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// The url the `origin` remote is configured with.
    pub fn remote_url(&self) -> &str {
        &self.target_url
    }

    pub fn proxy(&self) -> ProxyPolicy {
        self.proxy
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    /// Callbacks carrying this session's credentials and cancellation flag.
    pub fn remote_callbacks(&self) -> RemoteCallbacks<'static> {
        let mut callbacks = RemoteCallbacks::new();

        let auth = self.auth.clone();
        let cancellation = self.cancellation.clone();
        let mut attempts = 0;
        callbacks.credentials(move |_url, username_from_url, allowed| {
            if cancellation.is_cancelled() {
                return Err(git2::Error::from_str("operation cancelled"));
            }
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str(
                    "authentication failed: credentials were rejected",
                ));
            }
            auth.credentials(username_from_url, allowed)
        });

        let cancellation = self.cancellation.clone();
        callbacks.transfer_progress(move |progress| {
            trace!(
                received = progress.received_objects(),
                total = progress.total_objects(),
                bytes = progress.received_bytes(),
                "transfer progress"
            );
            !cancellation.is_cancelled()
        });

        let cancellation = self.cancellation.clone();
        callbacks.sideband_progress(move |_| !cancellation.is_cancelled());

        callbacks
    }

    pub fn proxy_options(&self) -> ProxyOptions<'static> {
        let mut proxy = ProxyOptions::new();
        match self.proxy {
            ProxyPolicy::Auto => {
                proxy.auto();
            }
        }
        proxy
    }

    /// Fetch options for this session with the given tag download policy.
    pub fn fetch_options(&self, tags: AutotagOption) -> FetchOptions<'static> {
        let mut options = FetchOptions::new();
        options
            .remote_callbacks(self.remote_callbacks())
            .proxy_options(self.proxy_options())
            .download_tags(tags);
        options
    }

    /// Wrap a failed network call, reporting cancellation when it was requested.
    pub(crate) fn network_error(&self, action: &'static str, source: git2::Error) -> CheckoutError {
        if self.cancellation.is_cancelled() {
            return CheckoutError::Cancelled {
                action,
                target: self.target_url.clone(),
            };
        }
        CheckoutError::Git {
            action,
            target: self.target_url.clone(),
            source,
        }
    }
}
