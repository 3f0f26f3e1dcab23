//! The shared temporary workspace holding every working copy of a run.
//!
//! Clones live at `<root>/repo/<name>`. The workspace is removed as a whole
//! once all sources are processed. Git writes its object files read-only, so
//! removal first clears the read-only flag on everything below the root.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Directory under the workspace root that holds the clones.
const CLONES_DIR: &str = "repo";

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the working copy of the source called `name` lives.
    pub fn clone_path(&self, name: &str) -> PathBuf {
        self.root.join(CLONES_DIR).join(name)
    }

    /// Delete the workspace and everything in it.
    ///
    /// A workspace that does not exist is already clean. Removal is attempted
    /// even when some permissions could not be fixed; the first problem is
    /// the one reported.
    pub fn remove(&self) -> Result<()> {
        if !self.root.exists() {
            debug!("workspace {} does not exist", self.root.display());
            return Ok(());
        }

        info!("removing workspace {}", self.root.display());
        let writable = make_writable(&self.root);
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {
                if let Err(e) = writable {
                    debug!("{}", e);
                }
                Ok(())
            }
            Err(e) => Err(writable.err().unwrap_or(Error::WorkspaceCleanup {
                path: self.root.clone(),
                message: e.to_string(),
            })),
        }
    }
}

/// Make `root` and every entry below it writable by the owner.
///
/// Entries that cannot be visited or changed are skipped; the first such
/// error is returned once the whole tree has been walked.
pub fn make_writable(root: &Path) -> Result<()> {
    let cleanup_error = |message: String| Error::WorkspaceCleanup {
        path: root.to_path_buf(),
        message,
    };
    let mut first_error = None;

    // Directories are yielded before their contents, so a directory fixed
    // here can be descended into right after.
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let result = entry.map_err(|e| cleanup_error(e.to_string())).and_then(|entry| {
            if entry.path_is_symlink() {
                return Ok(());
            }
            let metadata = entry.metadata().map_err(|e| cleanup_error(e.to_string()))?;
            let mut permissions = metadata.permissions();
            if set_writable(&mut permissions, metadata.is_dir()) {
                fs::set_permissions(entry.path(), permissions).map_err(|e| {
                    cleanup_error(format!("{}: {}", entry.path().display(), e))
                })?;
            }
            Ok(())
        });
        if let Err(e) = result {
            debug!("{}", e);
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Returns whether `permissions` changed.
#[cfg(unix)]
fn set_writable(permissions: &mut fs::Permissions, is_dir: bool) -> bool {
    use std::os::unix::fs::PermissionsExt;
    let wanted = if is_dir { 0o700 } else { 0o200 };
    let mode = permissions.mode();
    if mode & wanted == wanted {
        return false;
    }
    permissions.set_mode(mode | wanted);
    true
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn set_writable(permissions: &mut fs::Permissions, _is_dir: bool) -> bool {
    if !permissions.readonly() {
        return false;
    }
    permissions.set_readonly(false);
    true
}
