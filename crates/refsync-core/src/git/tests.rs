//! Tests for the git module.

use super::*;

mod revision_tests {
    use super::*;
    use crate::git::revision::{branch_filter, tag_filter};

    #[test]
    fn format_revision_joins_name_and_hash() {
        assert_eq!(format_revision("main", "abc123"), "main/abc123");
        assert_eq!(format_revision("feature/x", "abc"), "feature/x/abc");
    }

    #[test]
    fn matching_ref_requires_exact_marker() {
        let refs = vec![RemoteRef::new("refs/heads/main", "aaaa")];

        assert!(matching_ref(&refs, "main", "main/aaaa").is_some());
        assert!(matching_ref(&refs, "main", "main/bbbb").is_none());
        assert!(matching_ref(&refs, "main", "other/aaaa").is_none());
        assert!(matching_ref(&refs, "main", "main/AAAA").is_none());
        assert!(matching_ref(&[], "main", "main/aaaa").is_none());
    }

    #[test]
    fn tag_marker_matches_either_advertisement() {
        let refs = vec![
            RemoteRef::new("refs/tags/v1.0.0", "tagobject"),
            RemoteRef::new("refs/tags/v1.0.0^{}", "peeledcommit"),
        ];

        let matched = matching_ref(&refs, "v1.0.0", "v1.0.0/peeledcommit").unwrap();
        assert_eq!(matched.commit_id, "peeledcommit");

        let matched = matching_ref(&refs, "v1.0.0", "v1.0.0/tagobject").unwrap();
        assert_eq!(matched.commit_id, "tagobject");
    }

    #[test]
    fn listing_filters() {
        assert_eq!(branch_filter("main"), vec!["refs/heads/main".to_string()]);
        assert_eq!(
            tag_filter("v1"),
            vec!["refs/tags/v1".to_string(), "refs/tags/v1^{}".to_string()]
        );
    }
}

mod resolved_commit_tests {
    use super::*;

    #[test]
    fn revision_uses_short_ref_name() {
        let commit = ResolvedCommit::partial("abc", "refs/heads/main");
        assert_eq!(commit.revision(), "main/abc");

        let commit = ResolvedCommit::partial("abc", "refs/heads/feature/login");
        assert_eq!(commit.revision(), "feature/login/abc");

        let commit = ResolvedCommit::partial("abc", "refs/tags/v1.0.0");
        assert_eq!(commit.to_string(), "v1.0.0/abc");
    }

    #[test]
    fn detached_revision_uses_head() {
        let commit = ResolvedCommit::partial("abc", "");
        assert_eq!(commit.revision(), "HEAD/abc");
    }

    #[test]
    fn partial_commit_has_no_metadata() {
        let commit = ResolvedCommit::partial("abc", "refs/heads/main");
        assert!(commit.is_partial());
        assert!(commit.author.is_none());
        assert!(commit.message.is_empty());
    }

    #[test]
    fn short_message_truncates_subject() {
        let mut commit = ResolvedCommit::partial("abc", "");
        commit.message = "Fix the thing\n\nLonger body".to_string();
        assert_eq!(commit.short_message(), "Fix the thing");

        commit.message = "x".repeat(60);
        assert_eq!(commit.short_message(), format!("{}...", "x".repeat(50)));

        commit.message = "ü".repeat(50);
        assert_eq!(commit.short_message(), "ü".repeat(50));
    }

    #[test]
    fn serializes_to_json() {
        let commit = ResolvedCommit::partial("abc", "refs/heads/main");
        let json = serde_json::to_value(&commit).unwrap();
        assert_eq!(json["hash"], "abc");
        assert_eq!(json["reference"], "refs/heads/main");
        assert!(json["author"].is_null());
    }
}

mod repository_tests {
    use super::*;
    use crate::transport::{AuthOptions, TransportSession};
    use tempfile::TempDir;

    fn session(url: &str) -> TransportSession {
        TransportSession::new(url, AuthOptions::new("repo-tests"))
    }

    #[test]
    fn initialize_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let session = session("https://example.com/a.git");

        let repo = initialize_repository(temp.path(), &session).unwrap();
        ensure_remote(&repo, &session).unwrap();
        drop(repo);

        let repo = initialize_repository(temp.path(), &session).unwrap();
        let remote = ensure_remote(&repo, &session).unwrap();
        assert_eq!(remote.url(), Some("https://example.com/a.git"));
        assert_eq!(repo.remotes().unwrap().len(), 1);
    }

    #[test]
    fn stale_remote_is_repointed() {
        let temp = TempDir::new().unwrap();
        let repo = initialize_repository(temp.path(), &session("https://example.com/old.git"))
            .unwrap();
        ensure_remote(&repo, &session("https://example.com/old.git")).unwrap();

        let remote = ensure_remote(&repo, &session("https://example.com/new.git")).unwrap();
        assert_eq!(remote.url(), Some("https://example.com/new.git"));
        assert_eq!(remote.name(), Some(DEFAULT_REMOTE_NAME));
        assert_eq!(repo.remotes().unwrap().len(), 1);
    }
}

mod tag_catalog_tests {
    use super::*;
    use git2::{Repository, Signature as GitSignature, Time};
    use tempfile::TempDir;

    fn commit_at(repo: &Repository, seconds: i64, message: &str) -> git2::Oid {
        let sig = GitSignature::new("Test User", "test@example.com", &Time::new(seconds, 60))
            .unwrap();
        let tree_id = repo.treebuilder(None).unwrap().write().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents: Vec<git2::Commit<'_>> = repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parents: Vec<&git2::Commit<'_>> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn classifies_lightweight_and_annotated_tags() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let first = commit_at(&repo, 1_000, "first");
        let second = commit_at(&repo, 2_000, "second");

        let first_commit = repo.find_commit(first).unwrap();
        repo.tag_lightweight("v1.0.0", first_commit.as_object(), false)
            .unwrap();

        let second_commit = repo.find_commit(second).unwrap();
        let tagger =
            GitSignature::new("Tagger", "tagger@example.com", &Time::new(9_999, 0)).unwrap();
        repo.tag("v2.0.0", second_commit.as_object(), &tagger, "release", false)
            .unwrap();

        let catalog = TagCatalog::from_repository(&repo).unwrap();
        assert_eq!(catalog.len(), 2);

        let v1 = catalog.get("v1.0.0").unwrap();
        assert!(!v1.annotated);
        assert_eq!(v1.commit_id, first.to_string());
        assert_eq!(v1.ref_name, "refs/tags/v1.0.0");
        assert_eq!(v1.committed_at.timestamp(), 1_000);

        let v2 = catalog.get("v2.0.0").unwrap();
        assert!(v2.annotated);
        assert_eq!(v2.commit_id, second.to_string());
        // The peeled commit's time, not the tagger's.
        assert_eq!(v2.committed_at.timestamp(), 2_000);
        assert_eq!(v2.committed_at.offset().local_minus_utc(), 3_600);
    }

    #[test]
    fn tag_on_non_commit_fails_catalog() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        commit_at(&repo, 1_000, "first");

        let blob = repo.blob(b"not a commit").unwrap();
        let blob = repo.find_object(blob, None).unwrap();
        repo.tag_lightweight("blob-tag", &blob, false).unwrap();

        let err = TagCatalog::from_repository(&repo).unwrap_err();
        assert!(
            matches!(err, crate::error::CheckoutError::TagLookup { ref tag, .. } if tag == "blob-tag")
        );
    }

    #[test]
    fn empty_repository_has_empty_catalog() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let catalog = TagCatalog::from_repository(&repo).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn open_reads_catalog_from_path() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let oid = commit_at(&repo, 1_000, "first");
        let commit = repo.find_object(oid, None).unwrap();
        repo.tag_lightweight("v0.1.0", &commit, false).unwrap();

        let catalog = TagCatalog::open(temp.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("v0.1.0").unwrap().commit_id, oid.to_string());
    }

    #[test]
    fn open_missing_repository_fails() {
        let temp = TempDir::new().unwrap();
        let err = TagCatalog::open(&temp.path().join("absent")).unwrap_err();
        assert!(err.to_string().starts_with("unable to open repository"));
    }
}
