//! Default values for rules-sync configuration.
//!
//! This module provides centralized default values used across commands and
//! the configuration parser, ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "rules_config.conf";

/// Temporary workspace used when `--workspace` is not given.
///
/// The whole directory is deleted at the end of every run.
pub const DEFAULT_WORKSPACE: &str = "tmp";

/// Root under which sources without a `dest` key are written.
pub const DEFAULT_DEST_ROOT: &str = "base/rules";

/// Returns the destination used for a source that has no `dest` key.
///
/// This is `base/rules/<name>`, relative to the current directory.
pub fn default_dest(name: &str) -> PathBuf {
    Path::new(DEFAULT_DEST_ROOT).join(name)
}
