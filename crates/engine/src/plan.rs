//! Synchronization plans
//!
//! A plan is a set of global checks plus, for each path, an ordered chain of
//! actions. Each action is a fallback for the one before it: the first action
//! whose conditions pass is run and the rest are skipped.
//!
//! ```yaml
//! checks:
//!   - type: repo_is_clean
//!     params: {repo: target}
//! paths:
//!   - path: build/Makefile
//!     actions:
//!       - type: overwrite_file
//!         params: {create: true}
//!         conditions:
//!           - type: file_unaltered
//! ```

use crate::action::{Action, ActionConditions};
use crate::check::Check;
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::setup::Setup;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use skelsync_core::path::RelPath;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// A parsed synchronization plan
#[derive(Debug, Default)]
pub struct Plan {
    /// Run once before any path; any failure aborts the run
    pub checks: Vec<Box<dyn Check>>,
    /// Fallback chain of actions for each path, in document order
    pub paths: IndexMap<RelPath, Vec<Box<dyn Action>>>,
}

/// Serialization format of a plan document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    /// JSON document
    Json,
    /// YAML document (also accepts JSON text)
    Yaml,
}

impl PlanFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => PlanFormat::Json,
            _ => PlanFormat::Yaml,
        }
    }
}

/// Raw plan document, before type resolution
#[derive(Debug, Deserialize)]
struct PlanDocument {
    #[serde(default)]
    checks: Vec<CheckDocument>,
    #[serde(default)]
    paths: Vec<PathDocument>,
}

#[derive(Debug, Deserialize)]
struct CheckDocument {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct PathDocument {
    path: String,
    #[serde(default)]
    actions: Vec<ActionDocument>,
}

#[derive(Debug, Deserialize)]
struct ActionDocument {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    conditions: Vec<CheckDocument>,
}

/// How a path was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The path had no actions
    NoActions,
    /// The action at `index` in the chain ran
    Applied {
        /// Position in the fallback chain
        index: usize,
        /// Type string of the action
        kind: String,
    },
}

/// Outcome of one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathReport {
    /// Plan path
    pub path: RelPath,
    /// What happened to it
    pub resolution: Resolution,
}

/// Summary of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Number of global checks that passed
    pub checks_run: usize,
    /// Paths in the order they were handled
    pub paths: Vec<PathReport>,
}

impl ExecutionReport {
    /// Number of paths where an action ran
    pub fn applied(&self) -> usize {
        self.paths
            .iter()
            .filter(|p| matches!(p.resolution, Resolution::Applied { .. }))
            .count()
    }
}

impl Plan {
    /// Parse a JSON plan with the built-in types
    pub fn from_json(raw: &str) -> Result<Self> {
        Self::parse_with(&Registry::builtin(), PlanFormat::Json, raw)
    }

    /// Parse a YAML plan with the built-in types
    pub fn from_yaml(raw: &str) -> Result<Self> {
        Self::parse_with(&Registry::builtin(), PlanFormat::Yaml, raw)
    }

    /// Read and parse a plan file, picking the format from its extension
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::from(e).context(format!("failed to read plan file {}", path.display()))
        })?;
        Self::parse_with(&Registry::builtin(), PlanFormat::from_path(path), &raw)
    }

    /// Parse a plan against a custom registry
    ///
    /// Parsing is all-or-nothing: an unknown type or invalid parameter
    /// anywhere fails the whole document.
    pub fn parse_with(registry: &Registry, format: PlanFormat, raw: &str) -> Result<Self> {
        let document: PlanDocument = match format {
            PlanFormat::Json => {
                serde_json::from_str(raw).map_err(|e| Error::PlanSyntax(e.to_string()))?
            }
            PlanFormat::Yaml => {
                serde_yaml::from_str(raw).map_err(|e| Error::PlanSyntax(e.to_string()))?
            }
        };
        Self::from_document(registry, document)
    }

    fn from_document(registry: &Registry, document: PlanDocument) -> Result<Self> {
        let checks = document
            .checks
            .into_iter()
            .map(|check| build_check(registry, check))
            .collect::<Result<Vec<_>>>()?;

        let mut paths = IndexMap::with_capacity(document.paths.len());
        for entry in document.paths {
            let path = plan_path(&entry.path)?;
            let mut actions = Vec::with_capacity(entry.actions.len());
            for action in entry.actions {
                let conditions = action
                    .conditions
                    .into_iter()
                    .map(|check| build_check(registry, check))
                    .collect::<Result<Vec<_>>>()?;
                actions.push(registry.build_action(
                    &action.kind,
                    action.params,
                    ActionConditions::new(conditions),
                )?);
            }
            if paths.insert(path, actions).is_some() {
                warn!("path {:?} listed more than once, keeping the last entry", entry.path);
            }
        }
        Ok(Self { checks, paths })
    }

    /// Execute the plan against `setup`
    ///
    /// Global checks run first; any failure aborts. Then every path walks its
    /// fallback chain. A soft failure in an action's conditions moves on to the
    /// next action, unless it was the last one. A hard failure anywhere aborts
    /// the run immediately. Mutations made for earlier paths are not undone.
    pub fn execute(&self, setup: &Setup) -> Result<ExecutionReport> {
        let mut report = ExecutionReport::default();

        info!("running pre-checks");
        let root = RelPath::root();
        for check in &self.checks {
            check.check(&root, setup).map_err(|e| {
                error!("check {} failed: {e}", check.kind());
                Error::GlobalCheck {
                    kind: check.kind().to_string(),
                    source: Box::new(e),
                }
            })?;
            report.checks_run += 1;
        }

        info!("running actions for {} path(s)", self.paths.len());
        for (path, actions) in &self.paths {
            info!("syncing path {path}");
            let resolution = Self::sync_path(path, actions, setup)?;
            report.paths.push(PathReport {
                path: path.clone(),
                resolution,
            });
        }
        Ok(report)
    }

    fn sync_path(path: &RelPath, actions: &[Box<dyn Action>], setup: &Setup) -> Result<Resolution> {
        let mut last_failure = None;
        for (index, action) in actions.iter().enumerate() {
            debug!("trying action {} ({index}) for path {path}", action.kind());
            match action.check(path, setup) {
                Ok(()) => {}
                Err(e) if e.is_check_fail() => {
                    warn!("check failed, not running {}: {e}", action.kind());
                    last_failure = Some(e);
                    continue;
                }
                Err(e) => {
                    error!("unexpected error when running check: {e}");
                    return Err(Error::Condition {
                        path: path.clone(),
                        kind: action.kind().to_string(),
                        source: Box::new(e),
                    });
                }
            }

            action.run(path, setup).map_err(|e| {
                error!("action {} failed: {e}", action.kind());
                Error::Action {
                    path: path.clone(),
                    kind: action.kind().to_string(),
                    source: Box::new(e),
                }
            })?;
            info!("path {path} synced successfully");
            return Ok(Resolution::Applied {
                index,
                kind: action.kind().to_string(),
            });
        }

        match last_failure {
            Some(last) => Err(Error::NoMoreFallbacks {
                path: path.clone(),
                last: Box::new(last),
            }),
            None => {
                debug!("no actions for path {path}");
                Ok(Resolution::NoActions)
            }
        }
    }
}

/// Validate a path key: relative, inside the repository, not the root itself
/// and not under the `.git` metadata directory.
fn plan_path(raw: &str) -> Result<RelPath> {
    let invalid = |source| Error::InvalidPlanPath {
        path: raw.to_string(),
        source,
    };
    let path = RelPath::new(PathBuf::from(raw)).map_err(invalid)?;
    if path.is_empty() {
        return Err(invalid(skelsync_core::Error::Message(
            "path names the repository root".to_string(),
        )));
    }
    let in_metadata = path
        .as_path()
        .components()
        .next()
        .and_then(|first| first.as_os_str().to_str())
        .is_some_and(|first| first.eq_ignore_ascii_case(".git"));
    if in_metadata {
        return Err(invalid(skelsync_core::Error::Message(
            "path is inside repository metadata".to_string(),
        )));
    }
    Ok(path)
}

fn build_check(registry: &Registry, check: CheckDocument) -> Result<Box<dyn Check>> {
    registry.build_check(&check.kind, check.params)
}
