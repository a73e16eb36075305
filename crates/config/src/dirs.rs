//! XDG directory utilities
//!
//! `XDG_CONFIG_HOME` defaults to `~/.config` on Linux; other platforms use
//! their native configuration directory.

use std::path::PathBuf;

/// Get the skelsync configuration directory
///
/// Returns `$XDG_CONFIG_HOME/skelsync` or `~/.config/skelsync`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    ::dirs::config_dir().map(|d| d.join("skelsync"))
}

/// Get the default config file path
///
/// Returns `$XDG_CONFIG_HOME/skelsync/config.toml`
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}
