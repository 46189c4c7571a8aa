//! What a caller asks to check out.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Branch checked out when no ref is specified.
pub const DEFAULT_BRANCH: &str = "master";

/// The revision to resolve, dispatched once to one of four strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutIntent {
    /// The head of a branch, tracked through a local branch of the same name.
    Branch {
        name: String,
        last_revision: Option<String>,
    },
    /// A tag, checked out detached.
    Tag {
        name: String,
        last_revision: Option<String>,
    },
    /// An exact commit id, checked out detached.
    Commit { id: String },
    /// The newest tag satisfying a semantic version constraint.
    SemVer { constraint: String },
}

impl CheckoutIntent {
    pub fn branch(name: impl Into<String>) -> Self {
        CheckoutIntent::Branch {
            name: name.into(),
            last_revision: None,
        }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        CheckoutIntent::Tag {
            name: name.into(),
            last_revision: None,
        }
    }

    pub fn commit(id: impl Into<String>) -> Self {
        CheckoutIntent::Commit { id: id.into() }
    }

    pub fn semver(constraint: impl Into<String>) -> Self {
        CheckoutIntent::SemVer {
            constraint: constraint.into(),
        }
    }

    /// Set the revision observed by the previous checkout.
    ///
    /// Only branches and tags can short-circuit; other intents are returned
    /// unchanged.
    pub fn with_last_revision(self, revision: impl Into<String>) -> Self {
        match self {
            CheckoutIntent::Branch { name, .. } => CheckoutIntent::Branch {
                name,
                last_revision: Some(revision.into()),
            },
            CheckoutIntent::Tag { name, .. } => CheckoutIntent::Tag {
                name,
                last_revision: Some(revision.into()),
            },
            other => other,
        }
    }

    /// Short name of the strategy, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutIntent::Branch { .. } => "branch",
            CheckoutIntent::Tag { .. } => "tag",
            CheckoutIntent::Commit { .. } => "commit",
            CheckoutIntent::SemVer { .. } => "semver",
        }
    }
}

/// Checkout options as they appear in configuration.
///
/// Several refs may be set; [`CheckoutOptions::intent`] applies the
/// precedence commit, semver, tag, branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutOptions {
    pub branch: Option<String>,
    pub tag: Option<String>,
    pub semver: Option<String>,
    pub commit: Option<String>,
    pub last_revision: Option<String>,
    pub recurse_submodules: bool,
}

impl CheckoutOptions {
    /// Resolve the options into a single intent.
    ///
    /// Empty strings count as unset. Without any ref the branch
    /// [`DEFAULT_BRANCH`] is used.
    pub fn intent(&self) -> CheckoutIntent {
        if self.recurse_submodules {
            warn!("git submodule recursion is not supported, checking out without submodules");
        }

        let last_revision = non_empty(&self.last_revision).map(str::to_string);
        if let Some(commit) = non_empty(&self.commit) {
            return CheckoutIntent::commit(commit);
        }
        if let Some(constraint) = non_empty(&self.semver) {
            return CheckoutIntent::semver(constraint);
        }
        if let Some(tag) = non_empty(&self.tag) {
            return CheckoutIntent::Tag {
                name: tag.to_string(),
                last_revision,
            };
        }
        CheckoutIntent::Branch {
            name: non_empty(&self.branch)
                .unwrap_or(DEFAULT_BRANCH)
                .to_string(),
            last_revision,
        }
    }

    /// Overlay the refs set in `other` onto these options.
    ///
    /// If `other` names any ref, all refs are taken from `other` so a ref from
    /// configuration never outranks one given explicitly.
    pub fn merge(mut self, other: CheckoutOptions) -> Self {
        let names_ref = [&other.branch, &other.tag, &other.semver, &other.commit]
            .iter()
            .any(|value| non_empty(value).is_some());
        if names_ref {
            self.branch = other.branch;
            self.tag = other.tag;
            self.semver = other.semver;
            self.commit = other.commit;
        }
        if other.last_revision.is_some() {
            self.last_revision = other.last_revision;
        }
        self.recurse_submodules |= other.recurse_submodules;
        self
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_master_branch() {
        let intent = CheckoutOptions::default().intent();
        assert_eq!(intent, CheckoutIntent::branch("master"));
    }

    #[test]
    fn precedence_commit_semver_tag_branch() {
        let mut options = CheckoutOptions {
            branch: Some("main".into()),
            tag: Some("v1.0.0".into()),
            semver: Some(">=1.0.0".into()),
            commit: Some("abc123".into()),
            ..CheckoutOptions::default()
        };
        assert_eq!(options.intent(), CheckoutIntent::commit("abc123"));

        options.commit = None;
        assert_eq!(options.intent(), CheckoutIntent::semver(">=1.0.0"));

        options.semver = Some(String::new());
        assert_eq!(options.intent(), CheckoutIntent::tag("v1.0.0"));

        options.tag = None;
        assert_eq!(options.intent(), CheckoutIntent::branch("main"));
    }

    #[test]
    fn last_revision_applies_to_branch_and_tag() {
        let options = CheckoutOptions {
            tag: Some("v1.0.0".into()),
            last_revision: Some("v1.0.0/abc".into()),
            ..CheckoutOptions::default()
        };
        assert_eq!(
            options.intent(),
            CheckoutIntent::tag("v1.0.0").with_last_revision("v1.0.0/abc")
        );

        let commit = CheckoutIntent::commit("abc").with_last_revision("x/abc");
        assert_eq!(commit, CheckoutIntent::commit("abc"));
    }

    #[test]
    fn merge_explicit_ref_replaces_configured_refs() {
        let configured = CheckoutOptions {
            tag: Some("v1.0.0".into()),
            last_revision: Some("v1.0.0/abc".into()),
            ..CheckoutOptions::default()
        };
        let explicit = CheckoutOptions {
            branch: Some("dev".into()),
            ..CheckoutOptions::default()
        };

        let merged = configured.merge(explicit);
        assert_eq!(merged.tag, None);
        assert_eq!(
            merged.intent(),
            CheckoutIntent::branch("dev").with_last_revision("v1.0.0/abc")
        );
    }

    #[test]
    fn merge_without_refs_keeps_configuration() {
        let configured = CheckoutOptions {
            semver: Some("^2".into()),
            ..CheckoutOptions::default()
        };
        let merged = configured.clone().merge(CheckoutOptions::default());
        assert_eq!(merged, configured);
    }

    #[test]
    fn options_deserialize_from_toml() {
        let options: CheckoutOptions = toml::from_str(
            r#"
            branch = "main"
            last_revision = "main/0123"
            "#,
        )
        .unwrap();
        assert_eq!(options.branch.as_deref(), Some("main"));
        assert!(!options.recurse_submodules);
    }
}
