//! Shared test utilities for integration and E2E tests.
//!
//! Upstream repositories are real git repositories created in a temporary
//! directory with the `git` CLI, so no test needs network access.
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new();
//!     let upstream = fixture.upstream("rules");
//!     upstream.write("a/b.list", "x");
//!     upstream.commit("add b");
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git_available, TestFixture, Upstream};
}

/// Whether a usable `git` executable is on PATH.
///
/// Tests that need real repositories return early when it is not.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "`git {args:?}` failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// An upstream repository with a `main` branch.
pub struct Upstream {
    path: PathBuf,
}

impl Upstream {
    fn init(path: PathBuf) -> Self {
        std::fs::create_dir_all(&path).expect("Failed to create upstream directory");
        run_git(&path, &["init", "--quiet", "--initial-branch=main"]);
        run_git(&path, &["config", "user.email", "test@example.com"]);
        run_git(&path, &["config", "user.name", "Test"]);
        run_git(&path, &["config", "commit.gpgsign", "false"]);
        Self { path }
    }

    /// Location usable as the `url` of a source.
    pub fn url(&self) -> String {
        self.path.display().to_string()
    }

    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.path.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create directory");
        std::fs::write(path, content).expect("Failed to write file");
        self
    }

    pub fn remove(&self, relative: &str) -> &Self {
        run_git(&self.path, &["rm", "--quiet", relative]);
        self
    }

    /// Commit everything and return the new commit hash.
    pub fn commit(&self, message: &str) -> String {
        run_git(&self.path, &["add", "--all"]);
        run_git(&self.path, &["commit", "--quiet", "-m", message]);
        run_git(&self.path, &["rev-parse", "HEAD"])
    }

    /// Create `branch` from the current HEAD and switch to it.
    pub fn branch(&self, branch: &str) -> &Self {
        run_git(&self.path, &["checkout", "--quiet", "-b", branch]);
        self
    }

    pub fn switch(&self, branch: &str) -> &Self {
        run_git(&self.path, &["checkout", "--quiet", branch]);
        self
    }
}

/// A temporary directory holding upstream repositories, a workspace and an
/// output tree.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create an empty upstream repository called `name`.
    pub fn upstream(&self, name: &str) -> Upstream {
        Upstream::init(self.path().join("upstream").join(name))
    }

    pub fn workspace(&self) -> PathBuf {
        self.path().join("ws")
    }

    /// Destination directory for `name` under the output tree.
    pub fn out(&self, name: &str) -> PathBuf {
        self.path().join("out").join(name)
    }

    /// A path inside the fixture, for `assert_fs` assertions.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Write `rules_config.conf` and return its path.
    pub fn with_config(&self, content: &str) -> PathBuf {
        let config = self.temp_dir.child("rules_config.conf");
        config.write_str(content).expect("Failed to write config file");
        config.path().to_path_buf()
    }

    /// A `rules-sync` command running inside the fixture.
    #[allow(dead_code)]
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("rules-sync");
        cmd.current_dir(self.path())
            .env_remove("RULES_SYNC_CONFIG")
            .env_remove("RULES_SYNC_WORKSPACE")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
