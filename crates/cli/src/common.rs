//! Common utilities and types shared across CLI commands

use crate::error::{CommandError, Result};
use skelsync_core::path::AbsPath;
use std::fs;
use std::path::Path;

/// Resolved repository roots for a sync run
///
/// Both paths are canonicalized so that repository discovery and the plan's
/// relative paths agree on a single spelling of each directory.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    /// Template working tree (read side)
    pub template_dir: AbsPath,
    /// Target working tree (write side)
    pub target_dir: AbsPath,
}

impl ResolvedPaths {
    /// Resolve and canonicalize both directories
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidPath` if either directory does not exist.
    pub fn resolve(template_dir: &Path, target_dir: &Path) -> Result<Self> {
        Ok(Self {
            template_dir: canonical(template_dir)?,
            target_dir: canonical(target_dir)?,
        })
    }
}

fn canonical(path: &Path) -> Result<AbsPath> {
    let resolved = fs::canonicalize(path).map_err(|source| CommandError::InvalidPath {
        path: path.display().to_string(),
        source,
    })?;
    Ok(AbsPath::new(resolved)?)
}

/// Runtime context for CLI commands
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Resolved and canonicalized paths
    pub paths: ResolvedPaths,
}

impl RuntimeContext {
    /// Create a new runtime context
    ///
    /// # Errors
    ///
    /// Returns an error if path resolution or canonicalization fails.
    pub fn new(template_dir: &Path, target_dir: &Path) -> Result<Self> {
        let paths = ResolvedPaths::resolve(template_dir, target_dir)?;
        Ok(Self { paths })
    }

    /// Get the template directory (canonicalized)
    #[inline]
    pub fn template_dir(&self) -> &AbsPath {
        &self.paths.template_dir
    }

    /// Get the target directory (canonicalized)
    #[inline]
    pub fn target_dir(&self) -> &AbsPath {
        &self.paths.target_dir
    }
}
