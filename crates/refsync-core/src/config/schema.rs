//! Configuration schema for refsync.toml

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::checkout::parse_commit_id;
use crate::options::CheckoutOptions;
use crate::transport::{AuthOptions, derive_transport_id};
use crate::version::SemverConstraint;

/// Root configuration structure for refsync.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefsyncConfig {
    pub source: SourceConfig,
    pub checkout: CheckoutOptions,
    pub auth: AuthConfig,
}

/// Where to check out from and to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Remote repository url
    pub url: Option<String>,
    /// Working tree directory
    pub path: Option<PathBuf>,
}

/// Credentials for the remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Path to a PEM encoded SSH private key
    pub identity_file: Option<PathBuf>,
    /// Transport id; derived from url and path when unset
    pub transport_id: Option<String>,
}

impl RefsyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(url) = &self.source.url
            && url.trim().is_empty()
        {
            anyhow::bail!("source.url must not be empty");
        }

        if let Some(commit) = self.checkout.commit.as_deref().filter(|c| !c.is_empty()) {
            parse_commit_id(commit).context("Invalid checkout.commit")?;
        }
        if let Some(semver) = self.checkout.semver.as_deref().filter(|s| !s.is_empty()) {
            SemverConstraint::parse(semver).context("Invalid checkout.semver")?;
        }

        self.auth.validate().context("Invalid auth configuration")?;
        Ok(())
    }
}

impl AuthConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.password.is_some() && self.username.is_none() {
            anyhow::bail!("password is set without a username");
        }
        if let Some(id) = &self.transport_id
            && id.is_empty()
        {
            anyhow::bail!("transport_id must not be empty");
        }
        Ok(())
    }

    /// Values set in `other` replace the ones in `self`.
    pub fn merge(self, other: AuthConfig) -> Self {
        Self {
            username: other.username.or(self.username),
            password: other.password.or(self.password),
            identity_file: other.identity_file.or(self.identity_file),
            transport_id: other.transport_id.or(self.transport_id),
        }
    }

    /// Build the auth options for checking out `url` into `path`.
    ///
    /// Reads the identity file, if any.
    pub fn auth_options(&self, url: &str, path: &Path) -> anyhow::Result<AuthOptions> {
        let transport_id = self
            .transport_id
            .clone()
            .unwrap_or_else(|| derive_transport_id(url, path));

        let mut options = AuthOptions::new(transport_id);
        options.username = self.username.clone();
        options.password = self.password.clone();
        if let Some(identity_file) = &self.identity_file {
            let identity = std::fs::read_to_string(identity_file).with_context(|| {
                format!("Failed to read identity file: {}", identity_file.display())
            })?;
            options.identity = Some(identity);
        }
        Ok(options)
    }
}
