//! Authentication options for remote access.

use std::fmt;
use std::path::Path;

use git2::{Cred, CredentialType};

/// Credentials and the transport id a checkout runs under.
///
/// `transport_id` must be unique among concurrently running checkouts; it is
/// the key of the session in the [`SessionRegistry`](super::SessionRegistry).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthOptions {
    pub transport_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// PEM encoded private key for SSH remotes.
    pub identity: Option<String>,
}

impl AuthOptions {
    /// Create options with only a transport id (anonymous access).
    pub fn new(transport_id: impl Into<String>) -> Self {
        Self {
            transport_id: transport_id.into(),
            ..Self::default()
        }
    }

    /// Set username and password for HTTP(S) basic authentication.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the PEM encoded SSH private key.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Produce a credential for the types libgit2 is willing to accept.
    pub(crate) fn credentials(
        &self,
        username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, git2::Error> {
        let username = self
            .username
            .as_deref()
            .or(username_from_url)
            .unwrap_or("git");

        if allowed.is_ssh_key()
            && let Some(identity) = &self.identity
        {
            return Cred::ssh_key_from_memory(username, None, identity, None);
        }
        if allowed.is_user_pass_plaintext()
            && let (Some(user), Some(password)) = (&self.username, &self.password)
        {
            return Cred::userpass_plaintext(user, password);
        }
        if allowed.is_username() {
            return Cred::username(username);
        }
        Cred::default()
    }
}

impl fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthOptions")
            .field("transport_id", &self.transport_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("identity", &self.identity.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Derive a stable transport id for a url and checkout directory.
///
/// Two checkouts of the same url into different directories get different ids
/// and may therefore run concurrently.
pub fn derive_transport_id(url: &str, path: &Path) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(url.as_bytes());
    hasher.update(b"\0");
    hasher.update(path.to_string_lossy().as_bytes());
    let hash = hasher.finalize().to_hex();
    format!("refsync-{}", &hash[..16])
}
