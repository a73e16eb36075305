//! Skelsync CLI library
//!
//! This library contains the CLI logic for skelsync, making it reusable
//! for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;
pub mod stats;

use anyhow::{Context, Result};
use clap::Parser;
use skelsync_config::Config;
use std::path::PathBuf;

use cmd::sync::SyncCommand;
use command::Command;
use common::RuntimeContext;

/// Skelsync - keep generated projects in sync with their template
#[derive(Debug, Parser)]
#[command(name = "skelsync")]
#[command(about = "Apply a sync plan from a template repository to a target repository")]
#[command(version)]
#[command(long_about = "Apply a sync plan from a template repository to a target repository

The plan lists repository-wide checks and, for each path, an ordered chain of
actions. The first action whose conditions pass is applied; the rest are
fallbacks. Files customized in the target are detected by comparing them
against every version the template ever published.

Examples:
  • skelsync plan.json ../my-project
      → Sync from the template in the current directory

  • skelsync --template ~/src/skeleton plan.yaml .
      → Sync the current project from an explicit template")]
pub struct Cli {
    /// Plan file (JSON if the extension is .json, YAML otherwise)
    #[arg(value_name = "PLAN")]
    pub plan: PathBuf,

    /// Target repository to update
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Template repository (defaults to the config file, then the current directory)
    #[arg(long, env = "SKELSYNC_TEMPLATE", value_name = "DIR")]
    pub template: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, env = "SKELSYNC_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "SKELSYNC_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Settings after merging command line, environment and config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Template repository directory
    pub template_dir: PathBuf,
    /// Debug logging
    pub verbose: bool,
    /// Log file, if any
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Merge `cli` over `config`, falling back to the current directory for
    /// the template.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory is needed and unavailable.
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let template_dir = match cli
            .template
            .clone()
            .or_else(|| config.general.template.clone())
        {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };

        Ok(Self {
            template_dir,
            verbose: cli.verbose || config.general.verbose,
            log_file: cli
                .log_file
                .clone()
                .or_else(|| config.general.log_file.clone()),
        })
    }
}

/// Main entry point for the CLI logic
///
/// # Errors
///
/// Returns an error if:
/// - Configuration loading fails
/// - Logging initialization fails
/// - The template or target directory cannot be resolved
/// - The plan cannot be loaded or its execution stops
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(cli.config.as_deref())
        .map_err(crate::error::CommandError::config)?;
    let settings = Settings::resolve(&cli, &config)?;

    skelsync_config::logging::init(settings.verbose, settings.log_file.as_deref())?;
    tracing::debug!(
        "template {}, target {}",
        settings.template_dir.display(),
        cli.target.display()
    );

    let context = RuntimeContext::new(&settings.template_dir, &cli.target)?;
    let command = SyncCommand { plan: cli.plan };
    let report = command.execute(&context)?;

    stats::print_summary(&report);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use clap::CommandFactory;
    use skelsync_config::GeneralConfig;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("skelsync").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positionals_and_flags() {
        let cli = parse(&["-v", "--template", "/tpl", "plan.json", "/work/project"]);
        assert_eq!(cli.plan, PathBuf::from("plan.json"));
        assert_eq!(cli.target, PathBuf::from("/work/project"));
        assert_eq!(cli.template, Some(PathBuf::from("/tpl")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_plan_help_matches_format_detection() {
        use skelsync_engine::PlanFormat;
        use std::path::Path;

        let command = Cli::command();
        let plan = command
            .get_arguments()
            .find(|arg| arg.get_id() == "plan")
            .unwrap();
        let help = plan.get_help().unwrap().to_string();
        assert!(help.contains(".json"), "{help}");
        assert!(help.contains("YAML otherwise"), "{help}");

        assert_eq!(PlanFormat::from_path(Path::new("sync.json")), PlanFormat::Json);
        assert_eq!(PlanFormat::from_path(Path::new("sync.yml")), PlanFormat::Yaml);
        assert_eq!(PlanFormat::from_path(Path::new("sync.plan")), PlanFormat::Yaml);
        assert_eq!(PlanFormat::from_path(Path::new("sync")), PlanFormat::Yaml);
    }

    #[test]
    fn test_target_is_required() {
        assert!(Cli::try_parse_from(["skelsync", "plan.json"]).is_err());
    }

    #[test]
    fn test_command_line_overrides_config() {
        let mut cli = parse(&["plan.json", "target"]);
        cli.template = Some(PathBuf::from("/from/cli"));
        cli.log_file = Some(PathBuf::from("/cli.log"));
        let config = Config {
            general: GeneralConfig {
                template: Some(PathBuf::from("/from/config")),
                log_file: Some(PathBuf::from("/config.log")),
                verbose: true,
            },
        };

        let settings = Settings::resolve(&cli, &config).unwrap();
        assert_eq!(settings.template_dir, PathBuf::from("/from/cli"));
        assert_eq!(settings.log_file, Some(PathBuf::from("/cli.log")));
        assert!(settings.verbose);
    }

    #[test]
    fn test_config_fills_missing_options() {
        let mut cli = parse(&["plan.json", "target"]);
        cli.template = None;
        cli.log_file = None;
        let config = Config {
            general: GeneralConfig {
                template: Some(PathBuf::from("/from/config")),
                log_file: None,
                verbose: false,
            },
        };

        let settings = Settings::resolve(&cli, &config).unwrap();
        assert_eq!(settings.template_dir, PathBuf::from("/from/config"));
        assert_eq!(settings.log_file, None);
        assert!(!settings.verbose);
    }

    #[test]
    fn test_template_defaults_to_current_directory() {
        let mut cli = parse(&["plan.json", "target"]);
        cli.template = None;
        let settings = Settings::resolve(&cli, &Config::default()).unwrap();
        assert_eq!(settings.template_dir, std::env::current_dir().unwrap());
    }
}
