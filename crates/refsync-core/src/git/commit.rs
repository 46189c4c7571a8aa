//! The caller-visible description of a checked out commit.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::{Commit, Repository};
use serde::{Deserialize, Serialize};

use super::format_revision;

/// Subjects longer than this are truncated by [`ResolvedCommit::short_message`].
const SHORT_MESSAGE_LEN: usize = 50;

/// Author or committer of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub when: DateTime<FixedOffset>,
}

impl Signature {
    fn from_git(signature: &git2::Signature<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(signature.name_bytes()).into_owned(),
            email: String::from_utf8_lossy(signature.email_bytes()).into_owned(),
            when: git_time(signature.when()),
        }
    }
}

/// Convert a libgit2 timestamp into a zoned chrono timestamp.
pub(crate) fn git_time(time: git2::Time) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or(Utc.fix());
    DateTime::<Utc>::from_timestamp(time.seconds(), 0)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .with_timezone(&offset)
}

/// The commit a checkout resolved to.
///
/// When a checkout was short-circuited only `hash` and `reference` are set;
/// see [`ResolvedCommit::is_partial`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCommit {
    /// Lowercase hex commit id.
    pub hash: String,
    /// Full ref name (`refs/heads/main`, `refs/tags/v1.0.0`), empty when detached
    /// at a plain commit.
    pub reference: String,
    pub author: Option<Signature>,
    pub committer: Option<Signature>,
    /// ASCII armored signature, if the commit is signed.
    pub signature: Option<String>,
    /// The signed payload the signature is computed over.
    pub encoded: Option<String>,
    pub message: String,
}

impl ResolvedCommit {
    /// A commit known only by hash and reference.
    pub fn partial(hash: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            reference: reference.into(),
            author: None,
            committer: None,
            signature: None,
            encoded: None,
            message: String::new(),
        }
    }

    /// Build the full descriptor of `commit`.
    pub fn from_commit(repo: &Repository, commit: &Commit<'_>, reference: &str) -> Self {
        let (signature, encoded) = match repo.extract_signature(&commit.id(), None) {
            Ok((signature, payload)) => (
                Some(String::from_utf8_lossy(&signature).into_owned()),
                Some(String::from_utf8_lossy(&payload).into_owned()),
            ),
            Err(_) => (None, None),
        };

        Self {
            hash: commit.id().to_string(),
            reference: reference.to_string(),
            author: Some(Signature::from_git(&commit.author())),
            committer: Some(Signature::from_git(&commit.committer())),
            signature,
            encoded,
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        }
    }

    /// Whether only hash and reference are known (short-circuited checkout).
    pub fn is_partial(&self) -> bool {
        self.author.is_none() && self.committer.is_none()
    }

    /// The revision marker to pass back on the next checkout of the same ref.
    ///
    /// `refs/heads/main` at `abc` gives `main/abc`; a detached commit gives
    /// `HEAD/abc`.
    pub fn revision(&self) -> String {
        let mut parts = self.reference.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(_), Some(short)) if !short.is_empty() => {
                format_revision(short, &self.hash)
            }
            _ => format_revision("HEAD", &self.hash),
        }
    }

    /// First line of the message, truncated to 50 characters.
    pub fn short_message(&self) -> String {
        let subject = self.message.lines().next().unwrap_or_default();
        if subject.chars().count() > SHORT_MESSAGE_LEN {
            let truncated: String = subject.chars().take(SHORT_MESSAGE_LEN).collect();
            format!("{}...", truncated)
        } else {
            subject.to_string()
        }
    }
}

impl std::fmt::Display for ResolvedCommit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.revision())
    }
}
