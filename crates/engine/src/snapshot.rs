//! In-memory snapshot history
//!
//! [`SnapshotStore`] is an append-only list of full-tree snapshots. It
//! satisfies the same [`HistoryProvider`] contract as a git repository and is
//! handy wherever a real repository would be overkill.

use skelsync_core::path::RelPath;
use skelsync_core::{BlobHistory, HistoryProvider, Result};
use std::collections::BTreeMap;

/// Append-only store of file-tree snapshots
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    snapshots: Vec<BTreeMap<RelPath, Vec<u8>>>,
    dirty: bool,
}

impl SnapshotStore {
    /// Create an empty store (no history, clean)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot containing exactly the given files
    ///
    /// Returns the index of the new snapshot. Recording a snapshot marks the
    /// store clean again.
    pub fn commit<I, P, C>(&mut self, files: I) -> Result<usize>
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let mut tree = BTreeMap::new();
        for (path, content) in files {
            tree.insert(
                RelPath::try_from(path.as_ref())?,
                content.as_ref().to_vec(),
            );
        }
        self.snapshots.push(tree);
        self.dirty = false;
        Ok(self.snapshots.len() - 1)
    }

    /// Mark the store as having uncommitted changes
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Number of recorded snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshot has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl HistoryProvider for SnapshotStore {
    fn is_clean(&self) -> Result<bool> {
        Ok(!self.dirty)
    }

    fn history_of(&self, path: &RelPath) -> Result<BlobHistory<'_>> {
        let path = path.clone();
        Ok(Box::new(
            self.snapshots
                .iter()
                .rev()
                .filter_map(move |tree| tree.get(&path).cloned())
                .map(Ok),
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_history_skips_snapshots_without_path() {
        let mut store = SnapshotStore::new();
        store.commit([("a", "1")]).unwrap();
        store.commit([("b", "2")]).unwrap();
        store.commit([("a", "3")]).unwrap();

        let path = RelPath::try_from("a").unwrap();
        let blobs: Vec<Vec<u8>> = store
            .history_of(&path)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(blobs, vec![b"3".to_vec(), b"1".to_vec()]);
    }

    #[test]
    fn test_clean_state() {
        let mut store = SnapshotStore::new();
        assert!(store.is_clean().unwrap());
        store.mark_dirty();
        assert!(!store.is_clean().unwrap());
        store.commit([("a", "1")]).unwrap();
        assert!(store.is_clean().unwrap());
    }

    #[test]
    fn test_invalid_path_rejected() {
        let mut store = SnapshotStore::new();
        assert!(store.commit([("../escape", "x")]).is_err());
        assert!(store.is_empty());
    }
}
