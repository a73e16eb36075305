//! # skelsync engine
//!
//! Declarative synchronization of a target repository with the template it
//! was derived from.
//!
//! - **Plans**: global checks plus a fallback chain of actions per path
//! - **Checks**: pluggable predicates (`repo_is_clean`, `exists`, `file_unaltered`)
//! - **Actions**: pluggable mutations (`overwrite_file`, `overwrite_directory`)
//! - **History**: content digests of every recorded version of a path, from
//!   git or from an in-memory snapshot store
//! - **Setup**: resolution of the template and target repositories

pub mod action;
pub mod check;
pub mod error;
pub mod git;
pub mod hash;
pub mod plan;
pub mod registry;
pub mod setup;
pub mod snapshot;

#[cfg(test)]
mod test_support;

// Re-export path types from core
pub use skelsync_core::path::{AbsPath, RelPath};

pub use error::{Error, Result};

// Re-export commonly used types
pub use action::{Action, ActionConditions, OverwriteDirectoryAction, OverwriteFileAction};
pub use check::{Check, FileUnalteredChecker, PathExistsChecker, RepoIsCleanChecker};
pub use git::GitRepository;
pub use plan::{ExecutionReport, PathReport, Plan, PlanFormat, Resolution};
pub use registry::Registry;
pub use setup::{RepoId, RepoSetup, Setup};
pub use snapshot::SnapshotStore;
