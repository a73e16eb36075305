//! Core types and utilities for skelsync
//!
//! This is the foundation crate (Layer 0) that all other skelsync crates depend on.
//! It provides:
//! - Path types (AbsPath, RelPath)
//! - Base error types
//! - The repository history capability (`HistoryProvider`)
//!
//! This crate has no dependencies on other skelsync crates.

pub mod error;
pub mod path;
pub mod traits;

pub use error::{Error, Result};
pub use traits::{BlobHistory, HistoryProvider};
