//! Checks gate global plan execution and individual actions
//!
//! A check returns `Ok(())` when its condition holds, a soft
//! [`Error::CheckFail`] when it does not, and any other error when the
//! condition could not be evaluated at all.

use crate::error::{Error, Result};
use crate::hash::{hash_file, history_digests, short_hex};
use crate::setup::{RepoId, Setup};
use serde::{Deserialize, Serialize};
use skelsync_core::path::RelPath;
use std::fs;
use std::io::ErrorKind;
use tracing::debug;

/// A named, pluggable predicate over a path and the execution context
pub trait Check: std::fmt::Debug {
    /// Type string of the check, as written in plans
    fn kind(&self) -> &str;

    /// Evaluate the check for `path`
    fn check(&self, path: &RelPath, setup: &Setup) -> Result<()>;
}

/// Parameters naming a single repository, defaulting to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepoParams {
    /// Repository to inspect
    pub repo: RepoId,
}

impl Default for RepoParams {
    fn default() -> Self {
        Self {
            repo: RepoId::Target,
        }
    }
}

/// Checks whether the git repository is clean
///
/// The path is ignored because this checker inspects the state of a whole
/// repository.
#[derive(Debug, Clone, Default)]
pub struct RepoIsCleanChecker {
    /// Resolved parameters
    pub params: RepoParams,
}

impl RepoIsCleanChecker {
    /// Type string in plans
    pub const KIND: &'static str = "repo_is_clean";
}

impl Check for RepoIsCleanChecker {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn check(&self, _path: &RelPath, setup: &Setup) -> Result<()> {
        let repo = self.params.repo;
        debug!("checking if repository {repo} is clean");
        let clean = setup
            .repo(repo)
            .history()
            .is_clean()
            .map_err(|e| Error::from(e).context(format!("failed to inspect {repo} repository")))?;
        if clean {
            Ok(())
        } else {
            Err(Error::check_fail(format!("{repo} repository is not clean")))
        }
    }
}

/// Checks whether the file or directory at the path exists
#[derive(Debug, Clone, Default)]
pub struct PathExistsChecker {
    /// Resolved parameters
    pub params: RepoParams,
}

impl PathExistsChecker {
    /// Type string in plans
    pub const KIND: &'static str = "exists";
}

impl Check for PathExistsChecker {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn check(&self, path: &RelPath, setup: &Setup) -> Result<()> {
        debug!("checking if path {path} exists in repo {}", self.params.repo);
        let abs_path = setup.path_in_repo(self.params.repo, path);
        match fs::metadata(abs_path.as_path()) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::check_fail(format!("path {path} does not exist")))
            }
            Err(e) => Err(Error::Metadata {
                path: abs_path,
                source: e,
            }),
        }
    }
}

/// Parameters of [`FileUnalteredChecker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileUnalteredParams {
    /// Repository holding the file under test
    pub repo: RepoId,
    /// Repository whose history lists the acceptable versions
    #[serde(rename = "reference-repo", alias = "reference_repo")]
    pub reference_repo: RepoId,
}

impl Default for FileUnalteredParams {
    fn default() -> Self {
        Self {
            repo: RepoId::Target,
            reference_repo: RepoId::Template,
        }
    }
}

/// Checks that a file is an unaltered version of the same file in a
/// reference repository
///
/// The file may be any version ever committed to the reference repository,
/// not only the latest one, so the full history of the path is traversed.
/// A path the reference repository never recorded is exempt.
#[derive(Debug, Clone, Default)]
pub struct FileUnalteredChecker {
    /// Resolved parameters
    pub params: FileUnalteredParams,
}

impl FileUnalteredChecker {
    /// Type string in plans
    pub const KIND: &'static str = "file_unaltered";
}

impl Check for FileUnalteredChecker {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn check(&self, path: &RelPath, setup: &Setup) -> Result<()> {
        debug!("checking if file {path} has not been altered");
        let abs_path = setup.path_in_repo(self.params.repo, path);
        let reference = setup.repo(self.params.reference_repo).history();

        match fs::metadata(abs_path.as_path()) {
            Ok(metadata) if metadata.is_dir() => {
                return Err(Error::IsDirectory { path: abs_path });
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return if history_digests(reference, path)?.is_empty() {
                    debug!("{path} is absent and was never recorded, nothing to preserve");
                    Ok(())
                } else {
                    Err(Error::check_fail(format!("file {path} has been deleted")))
                };
            }
            Err(e) => {
                return Err(Error::Metadata {
                    path: abs_path,
                    source: e,
                });
            }
        }

        let known = history_digests(reference, path)?;
        if known.is_empty() {
            debug!("{path} has no recorded versions, treating as unaltered");
            return Ok(());
        }
        let current = hash_file(&abs_path)?;
        if known.contains(&current) {
            debug!("{path} matches recorded version {}", short_hex(&current));
            Ok(())
        } else {
            Err(Error::check_fail(format!("file {path} has been altered")))
        }
    }
}
