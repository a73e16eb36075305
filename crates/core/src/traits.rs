//! Core behavioral traits for skelsync components
//!
//! The synchronization engine only needs two things from a version-control
//! system: whether the working tree is clean, and what content a path has had
//! over time. Both are expressed through [`HistoryProvider`], so checks can be
//! driven by git, by an in-memory snapshot store in tests, or by anything else
//! that records versions of files.

use crate::Result;
use crate::path::RelPath;

/// Lazily produced contents of a path, one item per recorded version
pub type BlobHistory<'a> = Box<dyn Iterator<Item = Result<Vec<u8>>> + 'a>;

/// Repository history interface
///
/// # Examples
///
/// ```ignore
/// fn count_versions(repo: &dyn HistoryProvider, path: &RelPath) -> Result<usize> {
///     let mut n = 0;
///     for blob in repo.history_of(path)? {
///         blob?;
///         n += 1;
///     }
///     Ok(n)
/// }
/// ```
pub trait HistoryProvider {
    /// Whether the working tree has no untracked, modified or staged changes
    fn is_clean(&self) -> Result<bool>;

    /// Contents of `path` in every recorded version that contains it
    ///
    /// Order is unspecified. A path that was never recorded yields an empty
    /// sequence rather than an error.
    fn history_of(&self, path: &RelPath) -> Result<BlobHistory<'_>>;
}
