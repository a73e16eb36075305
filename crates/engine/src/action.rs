//! Actions copy template content onto the target repository
//!
//! Every action carries its own list of guard checks. The interpreter runs
//! [`Action::check`] first and only calls [`Action::run`] when all guards
//! pass.

use crate::check::Check;
use crate::error::{Error, Result};
use crate::setup::{RepoId, Setup};
use serde::{Deserialize, Serialize};
use skelsync_core::path::{AbsPath, RelPath};
use std::fs::{self, File, Metadata};
use std::io::{self, ErrorKind};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// A named, pluggable mutation of the target repository
pub trait Action: std::fmt::Debug {
    /// Type string of the action, as written in plans
    fn kind(&self) -> &str;

    /// Guard checks of this action, in evaluation order
    fn conditions(&self) -> &ActionConditions;

    /// Perform the action on `path`
    fn run(&self, path: &RelPath, setup: &Setup) -> Result<()>;

    /// Run the guard checks, stopping at the first failure
    fn check(&self, path: &RelPath, setup: &Setup) -> Result<()> {
        self.conditions().check(path, setup)
    }
}

/// Ordered guard checks attached to an action
#[derive(Debug, Default)]
pub struct ActionConditions {
    conditions: Vec<Box<dyn Check>>,
}

impl ActionConditions {
    /// Wrap a list of checks
    pub fn new(conditions: Vec<Box<dyn Check>>) -> Self {
        Self { conditions }
    }

    /// Number of guard checks
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether the action is unguarded
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Iterate over the guard checks
    pub fn iter(&self) -> impl Iterator<Item = &dyn Check> {
        self.conditions.iter().map(AsRef::as_ref)
    }

    /// Run every condition in order and return the first error, if any
    ///
    /// Errors are prefixed with the type of the failing check; soft failures
    /// stay soft.
    pub fn check(&self, path: &RelPath, setup: &Setup) -> Result<()> {
        for condition in &self.conditions {
            condition
                .check(path, setup)
                .map_err(|e| e.context(format!("check {}", condition.kind())))?;
        }
        Ok(())
    }
}

/// Parameters shared by the overwrite actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverwriteParams {
    /// Whether the destination may be created when it does not exist
    pub create: bool,
}

/// Overwrites a single file in the target with the template's copy
#[derive(Debug, Default)]
pub struct OverwriteFileAction {
    /// Guard checks
    pub conditions: ActionConditions,
    /// Resolved parameters
    pub params: OverwriteParams,
}

impl OverwriteFileAction {
    /// Type string in plans
    pub const KIND: &'static str = "overwrite_file";
}

impl Action for OverwriteFileAction {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn conditions(&self) -> &ActionConditions {
        &self.conditions
    }

    fn run(&self, path: &RelPath, setup: &Setup) -> Result<()> {
        let src = setup.path_in_repo(RepoId::Template, path);
        let dst = setup.path_in_repo(RepoId::Target, path);

        match stat(&dst)? {
            None if !self.params.create => return Err(Error::NotCreating { path: dst }),
            Some(info) if info.is_dir() => return Err(Error::IsDirectory { path: dst }),
            _ => {}
        }
        let src_info = match stat(&src)? {
            None => return Err(Error::SourceMissing { path: src }),
            Some(info) if info.is_dir() => return Err(Error::IsDirectory { path: src }),
            Some(info) => info,
        };

        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent.as_path()).map_err(|e| Error::DirectoryCreate {
                path: parent.clone(),
                source: e,
            })?;
        }
        debug!("copying {src} to {dst}");
        copy_file(&src, &dst, &src_info)
    }
}

/// Replaces a whole directory in the target with the template's copy
///
/// The destination is removed before copying, so files that exist only in the
/// target disappear.
#[derive(Debug, Default)]
pub struct OverwriteDirectoryAction {
    /// Guard checks
    pub conditions: ActionConditions,
    /// Resolved parameters
    pub params: OverwriteParams,
}

impl OverwriteDirectoryAction {
    /// Type string in plans
    pub const KIND: &'static str = "overwrite_directory";
}

impl Action for OverwriteDirectoryAction {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn conditions(&self) -> &ActionConditions {
        &self.conditions
    }

    fn run(&self, path: &RelPath, setup: &Setup) -> Result<()> {
        let src = setup.path_in_repo(RepoId::Template, path);
        let dst = setup.path_in_repo(RepoId::Target, path);

        let dst_exists = match stat(&dst)? {
            None if !self.params.create => return Err(Error::NotCreating { path: dst }),
            None => false,
            Some(info) if !info.is_dir() => return Err(Error::NotDirectory { path: dst }),
            Some(_) => true,
        };
        match stat(&src)? {
            None => return Err(Error::SourceMissing { path: src }),
            Some(info) if !info.is_dir() => return Err(Error::NotDirectory { path: src }),
            Some(_) => {}
        }

        if dst_exists {
            debug!("removing {dst}");
            fs::remove_dir_all(dst.as_path()).map_err(|e| Error::DirectoryRemove {
                path: dst.clone(),
                source: e,
            })?;
        }
        debug!("copying {src} to {dst}");
        copy_directory(&src, &dst)
    }
}

/// Metadata of `path`, or `None` if it does not exist
fn stat(path: &AbsPath) -> Result<Option<Metadata>> {
    match fs::metadata(path.as_path()) {
        Ok(info) => Ok(Some(info)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Metadata {
            path: path.clone(),
            source: e,
        }),
    }
}

/// Copy the directory `src` to `dst` so that afterwards both hold the same tree
///
/// Permission bits and modification times are carried over. Existing files
/// in `dst` that are not in `src` are left alone; callers wanting a
/// replace-in-full remove `dst` first.
pub fn copy_directory(src: &AbsPath, dst: &AbsPath) -> Result<()> {
    let mut directories = Vec::new();
    for entry in WalkDir::new(src.as_path()).follow_links(false) {
        let entry = entry.map_err(|e| Error::Walk {
            path: src.clone(),
            source: e,
        })?;
        let rel = AbsPath::from_path(entry.path())?.strip_prefix(src)?;
        let target = dst.join(&rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(target.as_path()).map_err(|e| Error::DirectoryCreate {
                path: target.clone(),
                source: e,
            })?;
            let info = entry.metadata().map_err(|e| Error::Walk {
                path: src.clone(),
                source: e,
            })?;
            directories.push((target, info));
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            let source = AbsPath::from_path(entry.path())?;
            let info = entry.metadata().map_err(|e| Error::Walk {
                path: src.clone(),
                source: e,
            })?;
            copy_file(&source, &target, &info)?;
        }
    }

    // Children first: writing into a directory bumps its mtime, and a
    // read-only directory cannot receive children.
    for (dir, info) in directories.iter().rev() {
        fs::set_permissions(dir.as_path(), info.permissions()).map_err(|e| Error::FileWrite {
            path: dir.clone(),
            source: e,
        })?;
        if let Err(e) = set_dir_mtime(dir, info) {
            debug!("could not preserve modification time of {dir}: {e}");
        }
    }
    Ok(())
}

/// Copy one file, preserving permission bits and modification time
fn copy_file(src: &AbsPath, dst: &AbsPath, info: &Metadata) -> Result<()> {
    let mut reader = File::open(src.as_path()).map_err(|e| Error::FileRead {
        path: src.clone(),
        source: e,
    })?;
    let write_err = |e| Error::FileWrite {
        path: dst.clone(),
        source: e,
    };
    let mut writer = File::create(dst.as_path()).map_err(write_err)?;
    io::copy(&mut reader, &mut writer).map_err(write_err)?;
    writer
        .set_modified(info.modified().map_err(write_err)?)
        .map_err(write_err)?;
    drop(writer);
    fs::set_permissions(dst.as_path(), info.permissions()).map_err(write_err)
}

fn set_dir_mtime(dir: &AbsPath, info: &Metadata) -> io::Result<()> {
    File::open(dir.as_path())?.set_modified(info.modified()?)
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &AbsPath) -> Result<()> {
    let destination = fs::read_link(link)?;
    std::os::unix::fs::symlink(&destination, target.as_path()).map_err(|e| Error::FileWrite {
        path: target.clone(),
        source: e,
    })
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &AbsPath) -> Result<()> {
    let source = AbsPath::from_path(link)?;
    let info = fs::metadata(link).map_err(|e| Error::Metadata {
        path: source.clone(),
        source: e,
    })?;
    if info.is_dir() {
        copy_directory(&source, target)
    } else {
        copy_file(&source, target, &info)
    }
}
