//! Helpers for building throwaway git repositories in tests

#![allow(clippy::unwrap_used, clippy::panic)]

use git2::{Commit, Oid, Repository, Signature};
use std::fs;
use std::path::Path;

pub(crate) fn init_repo(dir: &Path) -> Repository {
    Repository::init(dir).unwrap()
}

/// Write `files` into the working tree, stage them and commit on `HEAD`.
pub(crate) fn commit_files(repo: &Repository, files: &[(&str, &str)], message: &str) -> Oid {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();
    for (path, content) in files {
        let full = workdir.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(&full, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();
    commit_index(repo, message)
}

/// Delete `path` from the working tree and the index, then commit.
pub(crate) fn remove_and_commit(repo: &Repository, path: &str, message: &str) -> Oid {
    let workdir = repo.workdir().unwrap().to_path_buf();
    fs::remove_file(workdir.join(path)).unwrap();
    let mut index = repo.index().unwrap();
    index.remove_path(Path::new(path)).unwrap();
    index.write().unwrap();
    commit_index(repo, message)
}

fn commit_index(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let signature = Signature::now("skelsync", "skelsync@example.com").unwrap();
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap()
}
