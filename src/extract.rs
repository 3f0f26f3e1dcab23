//! # Rule Extraction
//!
//! Copies the files of a working copy that match a source's glob patterns
//! into its destination directory.
//!
//! ## Matching
//!
//! Each pattern is resolved against the working copy root with the `glob`
//! crate: matching is case-sensitive, `*` stays within one path component,
//! `**` spans any number of directories, and a leading `.` has to be spelled
//! out. The last rule keeps `**/*` from wandering into `.git`.
//!
//! A pattern ending in `**` selects every file below the directory it names,
//! so `rules/**` is resolved as `rules/**/*`.
//!
//! ## Layout
//!
//! With `keep_tree` a file at `a/b/c.yaml` lands at `dest/a/b/c.yaml`.
//! Without it the file lands at `dest/c.yaml`, and a later match with the same
//! file name silently replaces an earlier one. "Later" means: patterns in
//! declared order, and within one pattern the order `glob` yields paths in
//! (sorted per directory level).
//!
//! ## Failures
//!
//! A pattern without matches is a warning, not an error. A file that cannot be
//! copied is logged, recorded in the report and skipped; the remaining files
//! are still copied.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use glob::MatchOptions;
use log::{error, info, warn};
use serde::Serialize;

use crate::error::{Error, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// A file that was copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedFile {
    pub src: PathBuf,
    pub dst: PathBuf,
}

/// A file that matched but could not be copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyFailure {
    pub src: PathBuf,
    pub dst: Option<PathBuf>,
    pub message: String,
}

/// What an extraction did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub copied: Vec<CopiedFile>,
    /// Patterns that matched no regular file.
    pub empty_patterns: Vec<String>,
    pub failures: Vec<CopyFailure>,
}

/// Where a file at `relative` (to the repository root) is copied to.
pub fn destination_for(dest: &Path, relative: &Path, keep_tree: bool) -> Option<PathBuf> {
    let file_name = relative.file_name()?;
    if keep_tree {
        Some(match relative.parent() {
            Some(dir) => dest.join(dir).join(file_name),
            None => dest.join(file_name),
        })
    } else {
        Some(dest.join(file_name))
    }
}

/// Copy every file under `root` matching `patterns` into `dest`.
///
/// Fails only if `dest` cannot be created or a pattern is not valid glob
/// syntax; per-file problems end up in the report.
pub fn extract(
    root: &Path,
    patterns: &[String],
    dest: &Path,
    keep_tree: bool,
) -> Result<ExtractionReport> {
    fs::create_dir_all(dest)?;

    let mut report = ExtractionReport::default();
    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());

    for pattern in patterns {
        let full_pattern = format!("{}/{}", escaped_root, file_pattern(pattern));
        let mut matched = false;

        for entry in glob::glob_with(&full_pattern, MATCH_OPTIONS)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    // Something is there; it just could not be read.
                    matched = true;
                    error!("cannot read {}: {}", e.path().display(), e.error());
                    report.failures.push(CopyFailure {
                        src: e.path().to_path_buf(),
                        dst: None,
                        message: e.error().to_string(),
                    });
                    continue;
                }
            };

            if path.is_dir() {
                continue;
            }
            matched = true;

            match copy_match(root, &path, dest, keep_tree) {
                Ok(dst) => {
                    info!("copied {} to {}", path.display(), dst.display());
                    report.copied.push(CopiedFile { src: path, dst });
                }
                Err(failure) => {
                    error!("{}", failure.message);
                    report.failures.push(failure);
                }
            }
        }

        if !matched {
            warn!("pattern '{}' matched no files in {}", pattern, root.display());
            report.empty_patterns.push(pattern.clone());
        }
    }

    Ok(report)
}

/// `pattern` rewritten so that it only has to match files.
///
/// `glob` resolves a trailing `**` to directories alone, so `**` as the last
/// component is widened to `**/*`.
pub fn file_pattern(pattern: &str) -> Cow<'_, str> {
    if pattern == "**" || pattern.ends_with("/**") {
        Cow::Owned(format!("{}/*", pattern))
    } else {
        Cow::Borrowed(pattern)
    }
}

fn copy_match(
    root: &Path,
    path: &Path,
    dest: &Path,
    keep_tree: bool,
) -> std::result::Result<PathBuf, CopyFailure> {
    let failure = |dst: Option<PathBuf>, message: String| CopyFailure {
        src: path.to_path_buf(),
        dst,
        message,
    };

    let relative = path
        .strip_prefix(root)
        .map_err(|_| failure(None, format!("{} is outside {}", path.display(), root.display())))?;
    let dst = destination_for(dest, relative, keep_tree)
        .ok_or_else(|| failure(None, format!("{} has no file name", path.display())))?;

    copy_file(path, &dst).map_err(|e| failure(Some(dst.clone()), e.to_string()))?;
    Ok(dst)
}

/// Overwrite `dst` with `src`, keeping permissions and modification time.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    let copy_error = |message: String| Error::Copy {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        message,
    };

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| copy_error(e.to_string()))?;
    }
    fs::copy(src, dst).map_err(|e| copy_error(e.to_string()))?;

    let modified = fs::metadata(src)
        .and_then(|m| m.modified())
        .map_err(|e| copy_error(e.to_string()))?;
    // Setting the time needs write access; a read-only copy keeps the copy time.
    if let Ok(file) = fs::File::options().write(true).open(dst) {
        file.set_modified(modified)
            .map_err(|e| copy_error(e.to_string()))?;
    }
    Ok(())
}
