//! Git repository access
//!
//! [`GitRepository`] wraps a libgit2 repository discovered from a directory
//! and implements [`HistoryProvider`] on top of it: working-tree cleanliness
//! from `git status`, and path history by walking every commit reachable from
//! `HEAD`.

use crate::error::{Error, Result};
use git2::{ErrorCode, ObjectType, Oid, Repository, Revwalk, Sort, StatusOptions};
use skelsync_core::path::{AbsPath, RelPath};
use skelsync_core::{BlobHistory, HistoryProvider};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Helper function to convert git2 errors to `skelsync_core` errors
#[inline]
#[allow(clippy::needless_pass_by_value)]
fn core_err(context: &str, e: git2::Error) -> skelsync_core::Error {
    skelsync_core::Error::Repository(format!("{context}: {e}"))
}

/// A git repository with a working tree
pub struct GitRepository {
    repo: Repository,
    workdir: AbsPath,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}

impl GitRepository {
    /// Open the repository containing `path`
    ///
    /// Searches upward from `path` for version-control metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] if nothing is found, and
    /// [`Error::UnusableRepository`] for a bare repository.
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| Error::NotARepository {
            path: path.display().to_string(),
            source: e,
        })?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| Error::UnusableRepository {
                path: path.display().to_string(),
                reason: "bare repository has no working tree".to_string(),
            })?
            .components()
            .collect::<PathBuf>();
        let workdir = AbsPath::new(workdir)?;
        tracing::debug!("discovered git repository at {workdir}");
        Ok(Self { repo, workdir })
    }

    /// Root of the working tree
    pub fn workdir(&self) -> &AbsPath {
        &self.workdir
    }

    /// Versions of `path` across the history reachable from `HEAD`
    ///
    /// Each distinct blob is produced once, newest commit first. An unborn
    /// `HEAD` (no commits yet) yields nothing.
    pub fn file_history(&self, path: &RelPath) -> Result<FileHistory<'_>> {
        let walk = match self.repo.head() {
            Ok(_) => {
                let mut walk = self
                    .repo
                    .revwalk()
                    .map_err(|e| Error::git("starting revision walk", e))?;
                walk.push_head()
                    .map_err(|e| Error::git("pushing HEAD to revision walk", e))?;
                walk.set_sorting(Sort::TIME)
                    .map_err(|e| Error::git("sorting revision walk", e))?;
                Some(walk)
            }
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
            Err(e) => return Err(Error::git("resolving HEAD", e)),
        };
        Ok(FileHistory {
            repo: &self.repo,
            walk: if path.is_empty() { None } else { walk },
            path: path.clone(),
            seen: HashSet::new(),
        })
    }
}

/// One recorded version of a path
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// First commit (in walk order) that holds this version
    pub commit: Oid,
    /// Blob id of the content
    pub blob: Oid,
    /// Raw file content
    pub content: Vec<u8>,
}

/// Iterator over the distinct versions of a path, see [`GitRepository::file_history`]
pub struct FileHistory<'repo> {
    repo: &'repo Repository,
    walk: Option<Revwalk<'repo>>,
    path: RelPath,
    seen: HashSet<Oid>,
}

impl FileHistory<'_> {
    /// Blob id of the path in a commit, if the path is a file there
    fn blob_in(&self, commit: Oid) -> Result<Option<Oid>> {
        let commit = self
            .repo
            .find_commit(commit)
            .map_err(|e| Error::git(format!("looking up commit {commit}"), e))?;
        let tree = commit
            .tree()
            .map_err(|e| Error::git(format!("reading tree of commit {}", commit.id()), e))?;
        match tree.get_path(self.path.as_path()) {
            Ok(entry) if entry.kind() == Some(ObjectType::Blob) => Ok(Some(entry.id())),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(Error::git(format!("traversing tree to {}", self.path), e)),
        }
    }

    fn read_blob(&self, commit: Oid, blob: Oid) -> Result<HistoryEntry> {
        let content = self
            .repo
            .find_blob(blob)
            .map_err(|e| Error::git(format!("reading {} at {commit}", self.path), e))?
            .content()
            .to_vec();
        Ok(HistoryEntry {
            commit,
            blob,
            content,
        })
    }
}

impl Iterator for FileHistory<'_> {
    type Item = Result<HistoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let commit = match self.walk.as_mut()?.next()? {
                Ok(oid) => oid,
                Err(e) => return Some(Err(Error::git("walking history", e))),
            };
            match self.blob_in(commit) {
                Ok(Some(blob)) if self.seen.insert(blob) => {
                    return Some(self.read_blob(commit, blob));
                }
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl HistoryProvider for GitRepository {
    fn is_clean(&self) -> skelsync_core::Result<bool> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);
        let statuses = self
            .repo
            .statuses(Some(&mut options))
            .map_err(|e| core_err("failed to get worktree status", e))?;
        Ok(statuses
            .iter()
            .all(|entry| entry.status().is_empty() || entry.status().is_ignored()))
    }

    fn history_of(&self, path: &RelPath) -> skelsync_core::Result<BlobHistory<'_>> {
        let history = self
            .file_history(path)
            .map_err(|e| skelsync_core::Error::Repository(e.to_string()))?;
        Ok(Box::new(history.map(|entry| {
            entry
                .map(|entry| entry.content)
                .map_err(|e| skelsync_core::Error::Repository(e.to_string()))
        })))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::hash::{hash_content, history_digests};
    use crate::test_support::{commit_files, init_repo, remove_and_commit};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        fs::create_dir_all(dir.path().join("a/b")).unwrap();

        let repo = GitRepository::discover(&dir.path().join("a/b")).unwrap();
        assert_eq!(
            fs::canonicalize(repo.workdir().as_path()).unwrap(),
            fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    fn test_discover_not_a_repository() {
        let dir = TempDir::new().unwrap();
        if Repository::discover(dir.path()).is_ok() {
            // Temp dir lives inside a git checkout; nothing to assert.
            return;
        }
        let err = GitRepository::discover(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NotARepository { .. }));
    }

    #[test]
    fn test_fresh_repository_is_clean() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        let repo = GitRepository::discover(dir.path()).unwrap();
        assert!(repo.is_clean().unwrap());

        fs::write(dir.path().join("data.txt"), "lorem ipsum").unwrap();
        assert!(!repo.is_clean().unwrap());
    }

    #[test]
    fn test_modified_and_staged_files_are_not_clean() {
        let dir = TempDir::new().unwrap();
        let git = init_repo(dir.path());
        commit_files(&git, &[("a.txt", "one")], "initial");
        let repo = GitRepository::discover(dir.path()).unwrap();
        assert!(repo.is_clean().unwrap());

        fs::write(dir.path().join("a.txt"), "two").unwrap();
        assert!(!repo.is_clean().unwrap());

        let mut index = git.index().unwrap();
        index.add_path(Path::new("a.txt")).unwrap();
        index.write().unwrap();
        assert!(!repo.is_clean().unwrap());
    }

    #[test]
    fn test_untracked_file_in_new_directory_is_not_clean() {
        let dir = TempDir::new().unwrap();
        let git = init_repo(dir.path());
        commit_files(&git, &[("a.txt", "one")], "initial");
        fs::create_dir_all(dir.path().join("new/dir")).unwrap();
        fs::write(dir.path().join("new/dir/file"), "x").unwrap();

        let repo = GitRepository::discover(dir.path()).unwrap();
        assert!(!repo.is_clean().unwrap());
    }

    #[test]
    fn test_file_history_all_versions() {
        let dir = TempDir::new().unwrap();
        let git = init_repo(dir.path());
        commit_files(&git, &[("sub/a", "X")], "first");
        commit_files(&git, &[("other", "unrelated")], "second");
        commit_files(&git, &[("sub/a", "Y")], "third");

        let repo = GitRepository::discover(dir.path()).unwrap();
        let path = RelPath::try_from("sub/a").unwrap();
        let versions: Vec<Vec<u8>> = repo
            .file_history(&path)
            .unwrap()
            .map(|entry| entry.unwrap().content)
            .collect();
        assert_eq!(versions.len(), 2);
        assert!(versions.contains(&b"X".to_vec()));
        assert!(versions.contains(&b"Y".to_vec()));

        let digests = history_digests(&repo, &path).unwrap();
        assert!(digests.contains(&hash_content(b"X")));
        assert!(digests.contains(&hash_content(b"Y")));
    }

    #[test]
    fn test_file_history_survives_deletion() {
        let dir = TempDir::new().unwrap();
        let git = init_repo(dir.path());
        commit_files(&git, &[("a", "X"), ("b", "keep")], "first");
        remove_and_commit(&git, "a", "drop a");

        let repo = GitRepository::discover(dir.path()).unwrap();
        let path = RelPath::try_from("a").unwrap();
        assert_eq!(history_digests(&repo, &path).unwrap().len(), 1);
    }

    #[test]
    fn test_file_history_unknown_path_is_empty() {
        let dir = TempDir::new().unwrap();
        let git = init_repo(dir.path());
        commit_files(&git, &[("a", "X")], "first");

        let repo = GitRepository::discover(dir.path()).unwrap();
        let path = RelPath::try_from("nosuch_testfile.txt").unwrap();
        assert_eq!(repo.file_history(&path).unwrap().count(), 0);
    }

    #[test]
    fn test_file_history_unborn_head_is_empty() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        fs::write(dir.path().join("a"), "uncommitted").unwrap();

        let repo = GitRepository::discover(dir.path()).unwrap();
        let path = RelPath::try_from("a").unwrap();
        assert_eq!(repo.file_history(&path).unwrap().count(), 0);
    }

    #[test]
    fn test_directory_path_has_no_blob_history() {
        let dir = TempDir::new().unwrap();
        let git = init_repo(dir.path());
        commit_files(&git, &[("sub/a", "X")], "first");

        let repo = GitRepository::discover(dir.path()).unwrap();
        let path = RelPath::try_from("sub").unwrap();
        assert_eq!(repo.file_history(&path).unwrap().count(), 0);
    }
}
