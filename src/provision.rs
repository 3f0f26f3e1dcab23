//! # Repository Provisioning
//!
//! The [`Provisioner`] makes sure a local working copy of a source exists in
//! the shared workspace and is checked out at the revision the source asks
//! for.
//!
//! ## Design
//!
//! Git access goes through the [`GitOperations`] trait. The application uses
//! [`DefaultGitOperations`], which shells out to the system `git` command; tests
//! swap in a mock to simulate clone and checkout failures without touching the
//! network.
//!
//! ## States
//!
//! Before cloning, the clone path is probed and falls into one of three states:
//!
//! - **Absent**: clone fresh.
//! - **Valid**: reuse the existing clone (for example one left behind by an
//!   interrupted run) and only check out again.
//! - **Invalid**: something is there but it is not a repository. Its revision
//!   is unknown, so it is deleted and cloned fresh.
//!
//! Any failure is returned as [`Error::Provision`] naming the source.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::{Revision, SourceSpec};
use crate::error::{Error, Result};
use crate::git::RepoState;
use crate::workspace::{self, Workspace};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations {
    /// Clone `url` into `target_dir`.
    fn clone_repo(&self, url: &str, target_dir: &Path) -> Result<()>;

    /// Report what lives at `path`.
    fn probe(&self, path: &Path) -> Result<RepoState>;

    /// Check out a commit-ish or branch name.
    fn checkout(&self, repo: &Path, revision: &str) -> Result<()>;

    /// Branch HEAD points at, `None` when detached.
    fn active_branch(&self, repo: &Path) -> Result<Option<String>>;

    /// Default branch of the remote the repository was cloned from.
    fn remote_default_branch(&self, repo: &Path) -> Result<Option<String>>;

    /// Commit HEAD resolves to.
    fn head_commit(&self, repo: &Path) -> Result<String>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_repo(&self, url: &str, target_dir: &Path) -> Result<()> {
        crate::git::clone(url, target_dir)
    }

    fn probe(&self, path: &Path) -> Result<RepoState> {
        crate::git::probe(path)
    }

    fn checkout(&self, repo: &Path, revision: &str) -> Result<()> {
        crate::git::checkout(repo, revision)
    }

    fn active_branch(&self, repo: &Path) -> Result<Option<String>> {
        crate::git::active_branch(repo)
    }

    fn remote_default_branch(&self, repo: &Path) -> Result<Option<String>> {
        crate::git::remote_default_branch(repo)
    }

    fn head_commit(&self, repo: &Path) -> Result<String> {
        crate::git::head_commit(repo)
    }
}

/// A local clone of a source, checked out at its requested revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopy {
    pub name: String,
    pub path: PathBuf,
    /// Commit HEAD resolved to after checkout.
    pub commit: String,
}

pub struct Provisioner {
    git_ops: Box<dyn GitOperations>,
    workspace: Workspace,
}

impl Provisioner {
    /// Creates a provisioner that uses the system `git` command.
    pub fn new(workspace: Workspace) -> Self {
        Self::with_operations(Box::new(DefaultGitOperations), workspace)
    }

    /// Creates a provisioner with a custom `GitOperations` implementation.
    pub fn with_operations(git_ops: Box<dyn GitOperations>, workspace: Workspace) -> Self {
        Self { git_ops, workspace }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Materialize the working copy of `source` and check out its revision.
    pub fn provision(&self, source: &SourceSpec) -> Result<WorkingCopy> {
        self.provision_inner(source)
            .map_err(|e| Error::provision(&source.name, e))
    }

    fn provision_inner(&self, source: &SourceSpec) -> Result<WorkingCopy> {
        let path = self.workspace.clone_path(&source.name);

        match self.git_ops.probe(&path)? {
            RepoState::Valid => {
                info!("repo {} exists", path.display());
            }
            RepoState::Absent => {
                info!("cloning repo {} to {}", source.url, path.display());
                self.git_ops.clone_repo(&source.url, &path)?;
            }
            RepoState::Invalid => {
                warn!(
                    "{} is not a git repository, removing it and cloning again",
                    path.display()
                );
                discard(&path)?;
                info!("cloning repo {} to {}", source.url, path.display());
                self.git_ops.clone_repo(&source.url, &path)?;
            }
        }

        match &source.revision {
            Revision::Commit(commit) => self.git_ops.checkout(&path, commit)?,
            Revision::Branch(branch) => self.git_ops.checkout(&path, branch)?,
            Revision::Default => {
                // A reused clone may have been left on another revision.
                // Without a remote default, a detached HEAD stays where it is.
                let branch = match self.git_ops.remote_default_branch(&path)? {
                    Some(branch) => Some(branch),
                    None => self.git_ops.active_branch(&path)?,
                };
                if let Some(branch) = branch {
                    self.git_ops.checkout(&path, &branch)?;
                }
            }
        }

        let commit = self.git_ops.head_commit(&path)?;
        info!("{} checked out at {} ({})", source.name, commit, source.revision);

        Ok(WorkingCopy {
            name: source.name.clone(),
            path,
            commit,
        })
    }
}

fn discard(path: &Path) -> Result<()> {
    if path.is_dir() {
        let writable = workspace::make_writable(path);
        if let Err(e) = fs::remove_dir_all(path) {
            return Err(writable.err().unwrap_or(Error::Io(e)));
        }
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}
