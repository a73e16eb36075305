//! Configuration management
//!
//! This module handles loading the skelsync configuration file.
//!
//! ```toml
//! [general]
//! template = "~/src/project-skeleton"
//! logFile = "~/.cache/skelsync.log"
//! verbose = false
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// General configuration section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Template repository used when none is given on the command line
    #[serde(default)]
    pub template: Option<PathBuf>,

    /// File that receives a copy of all log output
    #[serde(default, rename = "logFile")]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[serde(default)]
    pub verbose: bool,
}

/// Skelsync configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// General configuration section
    #[serde(default)]
    pub general: GeneralConfig,
}

impl Config {
    /// Load configuration from a file
    ///
    /// Relative paths and `~` are resolved against the file's directory and
    /// the home directory.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or TOML parsing fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            skelsync_core::Error::Message(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let mut config = Self::from_toml_str(&content).map_err(|e| {
            skelsync_core::Error::Message(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;

        if let Some(parent) = path.parent() {
            config.resolve_relative_paths(parent);
        }
        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from a TOML string without resolving paths
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing fails
    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        toml::from_str(toml_content).map_err(|e| skelsync_core::Error::Message(e.to_string()))
    }

    /// Load the effective configuration
    ///
    /// An explicit file must exist. Without one, the default location is
    /// read when present and built-in defaults are used otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit file is missing or any file fails to parse
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match crate::dirs::default_config_file() {
            Some(path) if path.is_file() => Self::load(path),
            _ => {
                debug!("no configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn resolve_relative_paths(&mut self, base_dir: &Path) {
        if let Some(ref template) = self.general.template {
            self.general.template = Some(Self::resolve_path(template, base_dir));
        }
        if let Some(ref log_file) = self.general.log_file {
            self.general.log_file = Some(Self::resolve_path(log_file, base_dir));
        }
    }

    /// Resolve a single path: expand `~/` and resolve relative paths
    fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();

        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = ::dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~"
            && let Some(home) = ::dirs::home_dir()
        {
            return home;
        }

        if path.is_relative() {
            base_dir.join(path)
        } else {
            path.to_path_buf()
        }
    }
}
