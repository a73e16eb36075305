//! Execution context for a synchronization run
//!
//! A [`Setup`] holds both parties of a sync: the template repository that
//! is the source of truth and the target repository being updated. Checks
//! and actions borrow it for the duration of one call and resolve plan paths
//! through it.

use crate::error::Result;
use crate::git::GitRepository;
use serde::{Deserialize, Serialize};
use skelsync_core::HistoryProvider;
use skelsync_core::path::{AbsPath, RelPath};
use std::path::Path;

/// Identifies one of the two repositories in a sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoId {
    /// The template repository (source of the update)
    #[serde(alias = "source")]
    Template,
    /// The repository being updated
    #[serde(alias = "plugin")]
    Target,
}

impl RepoId {
    /// Canonical name used in plans and messages
    pub fn as_str(self) -> &'static str {
        match self {
            RepoId::Template => "template",
            RepoId::Target => "target",
        }
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything known about a single repository
pub struct RepoSetup {
    path: AbsPath,
    history: Box<dyn HistoryProvider>,
}

impl std::fmt::Debug for RepoSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoSetup")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RepoSetup {
    /// Build a setup from a working tree root and its history provider
    pub fn new(path: AbsPath, history: impl HistoryProvider + 'static) -> Self {
        Self {
            path,
            history: Box::new(history),
        }
    }

    /// Discover the git repository containing `dir`
    ///
    /// The working tree root becomes the base for every plan path.
    pub fn discover(dir: &Path) -> Result<Self> {
        let repo = GitRepository::discover(dir)?;
        Ok(Self {
            path: repo.workdir().clone(),
            history: Box::new(repo),
        })
    }

    /// Working tree root
    pub fn path(&self) -> &AbsPath {
        &self.path
    }

    /// Version history of the repository
    pub fn history(&self) -> &dyn HistoryProvider {
        self.history.as_ref()
    }
}

/// Both parties of a synchronization run
#[derive(Debug)]
pub struct Setup {
    /// Source of the update
    pub template: RepoSetup,
    /// Repository being updated
    pub target: RepoSetup,
}

impl Setup {
    /// Create a setup from two resolved repositories
    pub fn new(template: RepoSetup, target: RepoSetup) -> Self {
        Self { template, target }
    }

    /// Discover both repositories by walking upward from the given directories
    ///
    /// # Errors
    ///
    /// Fails if either directory is not inside a git working tree.
    pub fn discover(template_dir: &Path, target_dir: &Path) -> Result<Self> {
        let template = RepoSetup::discover(template_dir)?;
        let target = RepoSetup::discover(target_dir)?;
        tracing::info!(
            "template repository: {}, target repository: {}",
            template.path(),
            target.path()
        );
        Ok(Self::new(template, target))
    }

    /// Get the setup of the requested repository
    pub fn repo(&self, id: RepoId) -> &RepoSetup {
        match id {
            RepoId::Template => &self.template,
            RepoId::Target => &self.target,
        }
    }

    /// Full path of a plan path inside the requested repository
    pub fn path_in_repo(&self, id: RepoId, path: &RelPath) -> AbsPath {
        self.repo(id).path().join(path)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::snapshot::SnapshotStore;
    use std::path::PathBuf;

    fn setup() -> Setup {
        Setup::new(
            RepoSetup::new(AbsPath::new("/tpl".into()).unwrap(), SnapshotStore::new()),
            RepoSetup::new(AbsPath::new("/plugin".into()).unwrap(), SnapshotStore::new()),
        )
    }

    #[test]
    fn test_path_in_repo() {
        let setup = setup();
        let path = RelPath::try_from("build/sync.go").unwrap();
        assert_eq!(
            setup.path_in_repo(RepoId::Template, &path).into_path_buf(),
            PathBuf::from("/tpl/build/sync.go")
        );
        assert_eq!(
            setup.path_in_repo(RepoId::Target, &path).into_path_buf(),
            PathBuf::from("/plugin/build/sync.go")
        );
    }

    #[test]
    fn test_repo_id_aliases() {
        let ids: Vec<RepoId> =
            serde_json::from_str(r#"["template", "source", "target", "plugin"]"#).unwrap();
        assert_eq!(
            ids,
            vec![
                RepoId::Template,
                RepoId::Template,
                RepoId::Target,
                RepoId::Target
            ]
        );
        assert!(serde_json::from_str::<RepoId>(r#""upstream""#).is_err());
    }

    #[test]
    fn test_repo_id_display() {
        assert_eq!(RepoId::Template.to_string(), "template");
        assert_eq!(RepoId::Target.to_string(), "target");
    }
}
