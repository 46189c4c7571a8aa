//! Shared fixtures: a local "remote" repository built with git2.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

use refsync_core::checkout::Checkout;
use refsync_core::transport::{AuthOptions, SessionRegistry};

pub struct RemoteRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl RemoteRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self { dir, repo }
    }

    /// The remote url: the plain path of the repository.
    pub fn url(&self) -> String {
        self.dir.path().to_str().unwrap().to_string()
    }

    /// Commit `content` as `file` on top of `branch`, at `secs` seconds past
    /// the epoch.
    pub fn commit(&self, branch: &str, file: &str, content: &str, secs: i64) -> Oid {
        let reference = format!("refs/heads/{branch}");
        let parent = self
            .repo
            .find_reference(&reference)
            .ok()
            .map(|r| r.peel_to_commit().unwrap());
        let parent_tree = parent.as_ref().map(|c| c.tree().unwrap());

        let blob = self.repo.blob(content.as_bytes()).unwrap();
        let mut builder = self.repo.treebuilder(parent_tree.as_ref()).unwrap();
        builder.insert(file, blob, 0o100644).unwrap();
        let tree = self.repo.find_tree(builder.write().unwrap()).unwrap();

        let sig = signature(secs);
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(
                Some(&reference),
                &sig,
                &sig,
                &format!("update {file}"),
                &tree,
                &parents,
            )
            .unwrap()
    }

    pub fn lightweight_tag(&self, name: &str, target: Oid) {
        let object = self.repo.find_object(target, None).unwrap();
        self.repo.tag_lightweight(name, &object, false).unwrap();
    }

    /// Create an annotated tag and return the id of the tag object.
    pub fn annotated_tag(&self, name: &str, target: Oid, secs: i64) -> Oid {
        let object = self.repo.find_object(target, None).unwrap();
        self.repo
            .tag(name, &object, &signature(secs), &format!("release {name}"), false)
            .unwrap()
    }
}

pub fn signature(secs: i64) -> Signature<'static> {
    Signature::new("Release Bot", "bot@example.com", &Time::new(secs, 0)).unwrap()
}

pub fn auth(id: &str) -> AuthOptions {
    AuthOptions::new(id)
}

/// A checkout with its own registry, isolated from other tests.
pub fn checkout() -> (Checkout, Arc<SessionRegistry>) {
    let registry = Arc::new(SessionRegistry::new());
    (Checkout::new().with_registry(registry.clone()), registry)
}

/// Names of the entries in `dir`, sorted.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
