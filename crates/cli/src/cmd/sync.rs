//! Sync command implementation
//!
//! Loads a plan file, opens the template and target repositories and runs the
//! plan against them.

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};
use skelsync_engine::{ExecutionReport, Plan, Setup};
use std::path::PathBuf;
use tracing::info;

/// Apply a sync plan from the template to the target
#[derive(Debug, Clone)]
pub struct SyncCommand {
    /// Plan file (JSON, or YAML by extension)
    pub plan: PathBuf,
}

impl Command for SyncCommand {
    type Output = ExecutionReport;

    fn execute(&self, context: &RuntimeContext) -> Result<ExecutionReport> {
        let plan = Plan::load(&self.plan).map_err(|source| CommandError::PlanError {
            path: self.plan.clone(),
            source,
        })?;
        info!(
            "loaded plan {} ({} check(s), {} path(s))",
            self.plan.display(),
            plan.checks.len(),
            plan.paths.len()
        );

        let setup = Setup::discover(
            context.template_dir().as_path(),
            context.target_dir().as_path(),
        )
        .map_err(CommandError::RepositoryError)?;

        plan.execute(&setup).map_err(CommandError::SyncError)
    }
}
