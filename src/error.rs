//! # Error Handling
//!
//! This module defines the centralized error type for `rules-sync`. It uses
//! `thiserror` to build a single `Error` enum covering every failure mode of a
//! synchronization run, with enough context (section, source name, paths) to
//! tell the user which source went wrong.
//!
//! ## Severity
//!
//! Most variants are scoped to one source and never abort a run on their own:
//!
//! - `Config`: a section is missing a required key or has a malformed value.
//!   The section is skipped.
//! - `Provision`: clone or checkout of a source failed. The source is skipped.
//! - `Copy`: one file could not be copied. The file is skipped and reported.
//! - `WorkspaceCleanup`: the temporary workspace could not be removed.
//!   Reported, best-effort.
//!
//! `ConfigParse` is the only variant that is fatal to the whole run: the
//! configuration document itself could not be read or parsed.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for rules-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration document could not be read or parsed.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A single section of the configuration is invalid.
    #[error("Invalid configuration in section [{section}]: {message}")]
    Config { section: String, message: String },

    /// Cloning a repository failed.
    #[error("Git clone error for {url}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// A git command other than clone failed inside a working copy.
    #[error("Git command failed in {}: {command} - {stderr}", path.display())]
    GitCommand {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// Provisioning a source's working copy failed.
    #[error("Failed to provision source '{source_name}': {cause}")]
    Provision {
        source_name: String,
        #[source]
        cause: Box<Error>,
    },

    /// Copying a matched file into its destination failed.
    #[error("Failed to copy {} to {}: {message}", src.display(), dst.display())]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        message: String,
    },

    /// The temporary workspace could not be removed at the end of a run.
    #[error("Failed to remove workspace {}: {message}", path.display())]
    WorkspaceCleanup { path: PathBuf, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl Error {
    /// Wrap an error as a provisioning failure of `source_name`.
    pub fn provision(source_name: &str, cause: Error) -> Self {
        Error::Provision {
            source_name: source_name.to_string(),
            cause: Box::new(cause),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
