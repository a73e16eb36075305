//! Command trait for the skelsync CLI
//!
//! Commands receive a `RuntimeContext` holding the loaded configuration and
//! the resolved repository paths.

use crate::common::RuntimeContext;
use crate::error::Result;

/// Trait for skelsync commands
///
/// # Example
///
/// ```rust,ignore
/// use crate::command::Command;
/// use crate::common::RuntimeContext;
/// use crate::error::Result;
///
/// pub struct ShowPaths;
///
/// impl Command for ShowPaths {
///     type Output = ();
///
///     fn execute(&self, context: &RuntimeContext) -> Result<()> {
///         println!("{} -> {}", context.template_dir(), context.target_dir());
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` if the command fails to execute. Error messages should
    /// be descriptive enough for the user to understand what went wrong.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
