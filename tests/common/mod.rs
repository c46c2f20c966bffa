// Shared test fixtures for integration tests
// Functions here are used across different test files
#![allow(dead_code)]

use git2::{Oid, Repository, Signature};
use repo_sizer::model::HistorySize;
use repo_sizer::repository::{GitObjectSource, ReferenceFilter, Scanner};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temporary git repository
pub fn create_test_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = Repository::init(&repo_path).unwrap();

    // Configure git user for commits
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    (dir, repo_path, repo)
}

fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@example.com").unwrap()
}

/// Add files to the repository and create a commit on HEAD
pub fn add_commit(repo: &Repository, files: &[(&str, &[u8])], message: &str) -> Oid {
    let mut index = repo.index().unwrap();

    for (path, content) in files {
        // Write file to working directory
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();

        index.add_path(Path::new(path)).unwrap();
    }

    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    commit_tree(repo, tree_id, message)
}

/// Commit `tree_id` on top of HEAD (or as a root commit)
pub fn commit_tree(repo: &Repository, tree_id: Oid, message: &str) -> Oid {
    let sig = signature();
    let tree = repo.find_tree(tree_id).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// Commit HEAD's tree again, unchanged
pub fn commit_same_tree(repo: &Repository, message: &str) -> Oid {
    let tree_id = repo.head().unwrap().peel_to_tree().unwrap().id();
    commit_tree(repo, tree_id, message)
}

/// Create an annotated tag named `name` pointing at `target`
pub fn tag(repo: &Repository, name: &str, target: Oid) -> Oid {
    let object = repo.find_object(target, None).unwrap();
    repo.tag(name, &object, &signature(), name, false).unwrap()
}

/// Create a branch at `commit` without touching HEAD
pub fn branch(repo: &Repository, name: &str, commit: Oid) {
    let commit = repo.find_commit(commit).unwrap();
    repo.branch(name, &commit, false).unwrap();
}

/// Full name of the branch HEAD points at
pub fn head_ref(repo: &Repository) -> String {
    repo.head().unwrap().name().unwrap().to_string()
}

/// Scan the repository at `path` with `filter`
pub fn scan_with(path: &Path, filter: &ReferenceFilter, names: bool) -> HistorySize {
    let mut source = GitObjectSource::open(path, filter).unwrap().with_names(names);
    Scanner::new().scan(&mut source).unwrap()
}

/// Scan every reference of the repository at `path`, with names
pub fn scan(path: &Path) -> HistorySize {
    scan_with(path, &ReferenceFilter::all(), true)
}
