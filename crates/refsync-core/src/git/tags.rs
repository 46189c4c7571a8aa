//! Enumeration and classification of repository tags.

use std::path::Path;

use chrono::{DateTime, FixedOffset};
use git2::Repository;
use serde::Serialize;
use tracing::debug;

use super::commit::git_time;
use crate::error::{CheckoutError, GitContext};

const TAG_PREFIX: &str = "refs/tags/";

/// A tag resolved to the commit it designates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagEntry {
    /// Tag name without the `refs/tags/` prefix.
    pub name: String,
    /// Full reference name.
    pub ref_name: String,
    /// The commit the tag designates; annotated tags are peeled.
    pub commit_id: String,
    /// Committer timestamp of that commit. The tag's own creation time is
    /// never used.
    pub committed_at: DateTime<FixedOffset>,
    pub annotated: bool,
}

/// Every tag in a repository, in reference name order.
#[derive(Debug, Clone, Default)]
pub struct TagCatalog {
    entries: Vec<TagEntry>,
}

impl TagCatalog {
    /// Open the repository at `path` and catalog its tags.
    pub fn open(path: &Path) -> Result<Self, CheckoutError> {
        let repo = Repository::open(path).git_context("open repository", path.display().to_string())?;
        Self::from_repository(&repo)
    }

    /// Build the catalog from all `refs/tags/*` references of `repo`.
    ///
    /// Each target is resolved as a commit first and as an annotated tag
    /// otherwise. A tag that resolves to neither fails the whole catalog.
    pub fn from_repository(repo: &Repository) -> Result<Self, CheckoutError> {
        let references = repo
            .references_glob("refs/tags/*")
            .git_context("list tags of", repo_label(repo))?;

        let mut entries = Vec::new();
        for reference in references {
            let reference = reference.git_context("read tag reference in", repo_label(repo))?;
            let ref_name = String::from_utf8_lossy(reference.name_bytes()).into_owned();
            let name = ref_name
                .strip_prefix(TAG_PREFIX)
                .unwrap_or(&ref_name)
                .to_string();

            let Some(target) = reference.target() else {
                return Err(CheckoutError::TagLookup {
                    source: git2::Error::from_str("tag reference is symbolic"),
                    tag: name,
                });
            };

            let entry = match repo.find_commit(target) {
                Ok(commit) => TagEntry {
                    commit_id: commit.id().to_string(),
                    committed_at: git_time(commit.committer().when()),
                    annotated: false,
                    name,
                    ref_name,
                },
                Err(_) => {
                    let commit = repo
                        .find_tag(target)
                        .and_then(|tag| tag.as_object().peel_to_commit());
                    let commit = match commit {
                        Ok(commit) => commit,
                        Err(source) => return Err(CheckoutError::TagLookup { tag: name, source }),
                    };
                    TagEntry {
                        commit_id: commit.id().to_string(),
                        committed_at: git_time(commit.committer().when()),
                        annotated: true,
                        name,
                        ref_name,
                    }
                }
            };
            entries.push(entry);
        }

        entries.sort_by(|a, b| a.ref_name.cmp(&b.ref_name));
        debug!(count = entries.len(), "built tag catalog");
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<TagEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&TagEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TagEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a TagCatalog {
    type Item = &'a TagEntry;
    type IntoIter = std::slice::Iter<'a, TagEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn repo_label(repo: &Repository) -> String {
    repo.workdir()
        .unwrap_or_else(|| repo.path())
        .display()
        .to_string()
}
