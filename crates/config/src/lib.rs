//! Configuration management for skelsync
//!
//! This crate handles:
//! - Loading the user configuration file
//! - XDG directory lookup
//! - Logging initialization

pub mod config;
pub mod dirs;
pub mod logging;

// Re-export error types from core
pub use skelsync_core::{Error, Result};

pub use config::{Config, GeneralConfig};
pub use dirs::{config_dir, default_config_file};
