//! Content hashing using blake3
//!
//! A [`Digest`] fingerprints file content so versions can be compared without
//! keeping the content around. [`history_digests`] collects the digests of
//! every recorded version of a path in a repository.

use crate::error::{Error, Result};
use skelsync_core::HistoryProvider;
use skelsync_core::path::{AbsPath, RelPath};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;

/// Content fingerprint (blake3, 256 bits)
pub type Digest = [u8; 32];

/// Hash content using blake3
///
/// # Examples
///
/// ```
/// use skelsync_engine::hash::hash_content;
///
/// let hash = hash_content(b"Hello, world!");
/// assert_eq!(hash.len(), 32);
/// ```
#[must_use]
pub fn hash_content(content: &[u8]) -> Digest {
    *blake3::hash(content).as_bytes()
}

/// Hash a file on disk with buffered reading
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn hash_file(path: &AbsPath) -> Result<Digest> {
    let file = File::open(path.as_path()).map_err(|e| Error::FileRead {
        path: path.clone(),
        source: e,
    })?;
    let mut reader = BufReader::new(file);
    let mut hasher = blake3::Hasher::new();
    std::io::copy(&mut reader, &mut hasher).map_err(|e| Error::FileRead {
        path: path.clone(),
        source: e,
    })?;
    Ok(*hasher.finalize().as_bytes())
}

/// Digests of every version of `path` recorded in `repo`
///
/// A path with no history yields the empty set. Callers treat that as "no
/// constraint", not as "altered".
pub fn history_digests(repo: &dyn HistoryProvider, path: &RelPath) -> Result<BTreeSet<Digest>> {
    let mut digests = BTreeSet::new();
    for blob in repo.history_of(path)? {
        digests.insert(hash_content(&blob?));
    }
    tracing::debug!(
        "{} distinct version(s) of {path} in history",
        digests.len()
    );
    Ok(digests)
}

/// Short hex form of a digest, for log output
#[must_use]
pub fn short_hex(digest: &Digest) -> String {
    hex::encode(&digest[..6])
}
