// Shared benchmark helpers
// Functions here are used across different benchmark files
#![allow(dead_code)]

use git2::{Repository, Signature};
use gix::ObjectId;
use repo_sizer::repository::{ChildMode, ChildRef, RawObject};
use std::path::PathBuf;
use tempfile::TempDir;

/// Deterministic, never-null object id
pub fn oid(n: u64) -> ObjectId {
    let mut bytes = [0u8; 20];
    bytes[..8].copy_from_slice(&n.to_be_bytes());
    bytes[19] = 1;
    ObjectId::from(bytes)
}

/// Linear history of `commits` commits over a flat tree of `files` blobs,
/// one blob rewritten per commit
///
/// Objects come newest first, the way a depth-first walk from the tip
/// discovers them, so nearly every object is parked before it is scored.
pub fn synthetic_history(commits: usize, files: usize) -> Vec<RawObject> {
    let mut next = 1u64;
    let mut fresh = || {
        next += 1;
        oid(next)
    };

    let mut objects = Vec::with_capacity(commits * 3 + files);
    let mut blobs: Vec<ObjectId> = (0..files).map(|_| fresh()).collect();
    for &id in &blobs {
        objects.push(RawObject::blob(id, 1000));
    }

    let mut parent: Option<ObjectId> = None;
    for c in 0..commits {
        let changed = fresh();
        blobs[c % files] = changed;
        objects.push(RawObject::blob(changed, 1000 + c as u64));

        let entries = blobs
            .iter()
            .enumerate()
            .map(|(i, id)| ChildRef::entry(*id, format!("file_{i}.rs"), ChildMode::Object))
            .collect();
        let tree = fresh();
        objects.push(RawObject::tree(tree, 40 * files as u64, entries));

        let commit = fresh();
        objects.push(RawObject::commit(commit, 220, tree, parent.as_slice()));
        parent = Some(commit);
    }

    objects.reverse();
    objects
}

/// Create a temporary git repository for benchmarks
pub fn create_bench_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = Repository::init(&repo_path).unwrap();

    // Configure git user for commits
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Bench User").unwrap();
    config.set_str("user.email", "bench@example.com").unwrap();

    (dir, repo_path, repo)
}

/// Add files and create a commit
pub fn add_commit(repo: &Repository, files: &[(&str, &[u8])], message: &str) -> git2::Oid {
    let sig = Signature::now("Bench User", "bench@example.com").unwrap();
    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();
        index.add_path(std::path::Path::new(path)).unwrap();
    }

    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());

    if let Some(parent) = parent {
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent]).unwrap()
    } else {
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[]).unwrap()
    }
}

/// Generate files for a benchmark repository
pub fn generate_files(num_files: usize) -> Vec<(String, Vec<u8>)> {
    (0..num_files)
        .map(|i| {
            let path = format!("src/dir_{}/file_{}.rs", i % 50, i);
            let content = format!("// File {}\nfn func_{}() {{}}\n", i, i).into_bytes();
            (path, content)
        })
        .collect()
}
