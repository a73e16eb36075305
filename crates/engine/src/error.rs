//! Error types for skelsync-engine
//!
//! Every check and action returns `Result<()>`. The error carries the
//! two-tier taxonomy the interpreter acts on:
//!
//! - [`Error::CheckFail`] is a *soft* failure: a named condition was not met.
//!   It makes the interpreter fall back to the next action for a path.
//! - Every other variant is a *hard* failure and aborts the run.

use skelsync_core::path::{AbsPath, RelPath};
use thiserror::Error;

/// Result type alias for skelsync-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for skelsync-engine
#[derive(Error, Debug)]
pub enum Error {
    /// A check did not pass
    #[error("{reason}")]
    CheckFail { reason: String },

    /// No version-control metadata found above a directory
    #[error("Failed to access git repository at {path}: {source}")]
    NotARepository {
        path: String,
        #[source]
        source: git2::Error,
    },

    /// Repository found but it cannot be synchronized (e.g. bare)
    #[error("Repository at {path} is not usable: {reason}")]
    UnusableRepository { path: String, reason: String },

    /// Git operation error
    #[error("Git error while {context}: {source}")]
    Git {
        context: String,
        #[source]
        source: git2::Error,
    },

    /// Error reading a file
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a file
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error creating a directory
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error removing a directory
    #[error("Failed to remove directory {path}: {source}")]
    DirectoryRemove {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error with file metadata
    #[error("Failed to read metadata for {path}: {source}")]
    Metadata {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Destination missing and the action may not create it
    #[error("path {path} does not exist, not creating")]
    NotCreating { path: AbsPath },

    /// Source path missing
    #[error("path {path} does not exist")]
    SourceMissing { path: AbsPath },

    /// Path exists but is a directory where a file was expected
    #[error("path {path} is a directory")]
    IsDirectory { path: AbsPath },

    /// Path exists but is not a directory where one was expected
    #[error("path {path} is not a directory")]
    NotDirectory { path: AbsPath },

    /// Failure while walking a directory tree
    #[error("Failed to walk directory {path}: {source}")]
    Walk {
        path: AbsPath,
        #[source]
        source: walkdir::Error,
    },

    /// Plan document is not valid JSON/YAML
    #[error("Failed to parse plan: {0}")]
    PlanSyntax(String),

    /// Unknown check type in a plan document
    #[error("unknown checker type {kind:?}")]
    UnknownCheck { kind: String },

    /// Unknown action type in a plan document
    #[error("unknown action type {kind:?}")]
    UnknownAction { kind: String },

    /// Parameters did not match the schema of their type
    #[error("failed to unmarshal params for {kind}: {source}")]
    InvalidParams {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// Path key in a plan document is not a usable relative path
    #[error("invalid plan path {path:?}: {source}")]
    InvalidPlanPath {
        path: String,
        #[source]
        source: skelsync_core::Error,
    },

    /// A global check failed, softly or not
    #[error("failed check {kind}: {source}")]
    GlobalCheck {
        kind: String,
        #[source]
        source: Box<Error>,
    },

    /// An action condition raised a hard error
    #[error("failed to run checks for action {kind} on path {path}: {source}")]
    Condition {
        path: RelPath,
        kind: String,
        #[source]
        source: Box<Error>,
    },

    /// An action failed to run
    #[error("action {kind} failed on path {path}: {source}")]
    Action {
        path: RelPath,
        kind: String,
        #[source]
        source: Box<Error>,
    },

    /// Every action of a path had a failing condition
    #[error("path {path} not handled - no more fallbacks (last: {last})")]
    NoMoreFallbacks {
        path: RelPath,
        #[source]
        last: Box<Error>,
    },

    /// Error from the shared core crate
    #[error(transparent)]
    Core(skelsync_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error with context
    #[error("{context}: {source}")]
    Other {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<skelsync_core::Error> for Error {
    fn from(err: skelsync_core::Error) -> Self {
        match err {
            skelsync_core::Error::Io(e) => Error::Io(e),
            other => Error::Core(other),
        }
    }
}

impl Error {
    /// Create a soft failure with the given reason
    pub fn check_fail(reason: impl Into<String>) -> Self {
        Error::CheckFail {
            reason: reason.into(),
        }
    }

    /// Whether this is a soft failure
    ///
    /// Errors wrapped with [`Error::context`] are inspected through the wrapper.
    pub fn is_check_fail(&self) -> bool {
        match self {
            Error::CheckFail { .. } => true,
            Error::Other { source, .. } => source
                .downcast_ref::<Error>()
                .is_some_and(Error::is_check_fail),
            _ => false,
        }
    }

    /// Create an error with additional context
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Other {
            context: context.into(),
            source: Box::new(self),
        }
    }

    pub(crate) fn git(context: impl Into<String>, source: git2::Error) -> Self {
        Error::Git {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_check_fail_displays_reason() {
        let err = Error::check_fail("path \"a\" does not exist");
        assert_eq!(err.to_string(), "path \"a\" does not exist");
        assert!(err.is_check_fail());
    }

    #[test]
    fn test_context_preserves_check_fail() {
        let err = Error::check_fail("file \"a\" has been altered").context("while checking");
        assert!(err.is_check_fail());
        assert_eq!(
            err.to_string(),
            "while checking: file \"a\" has been altered"
        );
    }

    #[test]
    fn test_io_error_is_hard() {
        let err: Error = std::io::Error::other("boom").into();
        assert!(!err.is_check_fail());
        assert!(!err.context("ctx").is_check_fail());
    }

    #[test]
    fn test_core_io_error_conversion() {
        let core = skelsync_core::Error::Io(std::io::Error::other("disk"));
        assert!(matches!(Error::from(core), Error::Io(_)));

        let core = skelsync_core::Error::Message("msg".into());
        assert!(matches!(Error::from(core), Error::Core(_)));
    }
}
