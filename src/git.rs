//! Thin wrappers around the system `git` command.
//!
//! Using the `git` executable instead of a library means clones pick up
//! whatever the user already has configured: SSH keys, credential helpers,
//! personal access tokens and `~/.gitconfig` settings.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::error::{Error, Result};

/// What lives at a clone path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoState {
    /// The path is the top level of a git working tree.
    Valid,
    /// Nothing exists at the path.
    Absent,
    /// Something exists at the path but it is not a repository root.
    Invalid,
}

fn git() -> Command {
    let mut cmd = Command::new("git");
    // Never block on a credential prompt; fail the source instead.
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

fn run_in(repo: &Path, args: &[&str]) -> Result<Output> {
    debug!("git -C {} {}", repo.display(), args.join(" "));
    git()
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            path: repo.to_path_buf(),
            stderr: e.to_string(),
        })
}

fn run_checked(repo: &Path, args: &[&str]) -> Result<String> {
    let output = run_in(repo, args)?;
    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            path: repo.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Clone `url` into `target_dir` with full history.
///
/// The parent directory is created if needed. `target_dir` itself must not
/// exist or be empty, as git requires.
pub fn clone(url: &str, target_dir: &Path) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    debug!("git clone {} {}", url, target_dir.display());
    let output = git()
        .args(["clone", "--quiet", url])
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            message: e.to_string(),
            hint: Some("Make sure git is installed and on PATH".to_string()),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        let hint = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
            || stderr.contains("terminal prompts disabled")
        {
            Some(
                "Make sure you have access to the repository (SSH key in ssh-agent, \
                 git credentials or a personal access token)"
                    .to_string(),
            )
        } else {
            None
        };

        return Err(Error::GitClone {
            url: url.to_string(),
            message: stderr,
            hint,
        });
    }

    Ok(())
}

/// Inspect `path` and report whether it holds a usable repository.
///
/// A directory nested inside some other repository is `Invalid`, not
/// `Valid`: only the top level of a working tree counts.
pub fn probe(path: &Path) -> Result<RepoState> {
    if !path.exists() {
        return Ok(RepoState::Absent);
    }
    if !path.is_dir() {
        return Ok(RepoState::Invalid);
    }

    let output = run_in(path, &["rev-parse", "--show-toplevel"])?;
    if !output.status.success() {
        return Ok(RepoState::Invalid);
    }

    let toplevel = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let same_root = match (fs::canonicalize(&toplevel), fs::canonicalize(path)) {
        (Ok(top), Ok(dir)) => top == dir,
        _ => false,
    };

    Ok(if same_root {
        RepoState::Valid
    } else {
        RepoState::Invalid
    })
}

/// Check out `revision` (a commit, tag or branch name) in `repo`.
///
/// A branch that only exists on the remote is created locally, tracking it.
pub fn checkout(repo: &Path, revision: &str) -> Result<()> {
    run_checked(repo, &["checkout", "--quiet", revision, "--"]).map(|_| ())
}

/// Name of the branch HEAD points at, or `None` when HEAD is detached.
pub fn active_branch(repo: &Path) -> Result<Option<String>> {
    let output = run_in(repo, &["symbolic-ref", "--quiet", "--short", "HEAD"])?;
    if output.status.success() {
        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(branch).filter(|b| !b.is_empty()))
    } else if output.status.code() == Some(1) {
        Ok(None)
    } else {
        Err(Error::GitCommand {
            command: "symbolic-ref --short HEAD".to_string(),
            path: repo.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Branch the remote `origin` had checked out when it was cloned, or `None`
/// when the clone does not know it.
pub fn remote_default_branch(repo: &Path) -> Result<Option<String>> {
    let output = run_in(
        repo,
        &["symbolic-ref", "--quiet", "--short", "refs/remotes/origin/HEAD"],
    )?;
    if output.status.success() {
        let reference = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(reference
            .strip_prefix("origin/")
            .filter(|b| !b.is_empty())
            .map(str::to_string))
    } else if output.status.code() == Some(1) {
        Ok(None)
    } else {
        Err(Error::GitCommand {
            command: "symbolic-ref --short refs/remotes/origin/HEAD".to_string(),
            path: repo.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Full hash of the commit HEAD resolves to.
pub fn head_commit(repo: &Path) -> Result<String> {
    run_checked(repo, &["rev-parse", "HEAD"])
}
