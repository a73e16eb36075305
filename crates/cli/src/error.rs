//! Error types for CLI commands

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid path error
    #[error("Invalid path: {path}")]
    InvalidPath {
        /// The invalid path
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The plan file could not be read or parsed
    #[error("Failed to load plan {}: {source}", path.display())]
    PlanError {
        /// Plan file
        path: PathBuf,
        /// Parse or read failure
        #[source]
        source: skelsync_engine::Error,
    },

    /// Template or target could not be opened as a repository
    #[error("Repository error: {0}")]
    RepositoryError(#[source] skelsync_engine::Error),

    /// Plan execution stopped
    #[error("Sync failed: {0}")]
    SyncError(#[source] skelsync_engine::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<skelsync_core::Error> for CommandError {
    fn from(err: skelsync_core::Error) -> Self {
        Self::Other(err.into())
    }
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;

impl CommandError {
    /// Create a `ConfigError` from any error type
    pub fn config<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::ConfigError(Box::new(err))
    }
}
