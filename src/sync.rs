//! # Synchronization Run
//!
//! Drives a whole run: every configured source is provisioned and, if that
//! worked, extracted. Sources are handled strictly one after another in the
//! order they are declared, which also decides who wins when flattened
//! sources share a destination.
//!
//! No failure of a single source stops the run. Rejected configuration
//! sections and sources that could not be provisioned are recorded as
//! skipped; copy failures are recorded per source. After the last source the
//! workspace is removed, whatever happened before. A source whose
//! destination lies inside the workspace would lose its output at that point,
//! so it is skipped up front.

use std::path::PathBuf;

use log::{error, info, warn};
use serde::Serialize;

use crate::config::{Config, SourceSpec};
use crate::error::{Error, Result};
use crate::extract::{self, CopiedFile, CopyFailure};
use crate::provision::Provisioner;
use crate::workspace::Workspace;

/// Outcome of one extracted source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub name: String,
    /// Commit the working copy was at when files were extracted.
    pub commit: String,
    pub dest: PathBuf,
    pub copied: Vec<CopiedFile>,
    pub empty_patterns: Vec<String>,
    pub failures: Vec<CopyFailure>,
}

/// A source that produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSource {
    pub name: String,
    pub reason: String,
}

/// A pattern that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyPattern<'a> {
    pub source: &'a str,
    pub pattern: &'a str,
}

/// Everything a caller needs to tell a clean run from a partial one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub succeeded: Vec<SourceReport>,
    pub skipped: Vec<SkippedSource>,
    pub cleanup_error: Option<String>,
}

impl RunReport {
    pub fn empty_patterns(&self) -> impl Iterator<Item = EmptyPattern<'_>> {
        self.succeeded.iter().flat_map(|source| {
            source.empty_patterns.iter().map(move |pattern| EmptyPattern {
                source: &source.name,
                pattern,
            })
        })
    }

    pub fn copy_failures(&self) -> impl Iterator<Item = (&str, &CopyFailure)> {
        self.succeeded.iter().flat_map(|source| {
            source
                .failures
                .iter()
                .map(move |failure| (source.name.as_str(), failure))
        })
    }

    pub fn files_copied(&self) -> usize {
        self.succeeded.iter().map(|s| s.copied.len()).sum()
    }

    /// No skipped source, no failed copy, workspace removed.
    ///
    /// Patterns without matches are warnings and do not count.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
            && self.copy_failures().next().is_none()
            && self.cleanup_error.is_none()
    }
}

pub struct Syncer {
    provisioner: Provisioner,
}

impl Syncer {
    /// Creates a syncer cloning into `workspace` with the system `git`.
    pub fn new(workspace: Workspace) -> Self {
        Self::with_provisioner(Provisioner::new(workspace))
    }

    pub fn with_provisioner(provisioner: Provisioner) -> Self {
        Self { provisioner }
    }

    /// Process every source of `config`, then remove the workspace.
    pub fn run(&self, config: &Config) -> RunReport {
        let mut report = RunReport::default();

        for rejected in &config.rejected {
            error!("skipping section [{}]: {}", rejected.section, rejected.error);
            report.skipped.push(SkippedSource {
                name: rejected.section.clone(),
                reason: rejected.error.to_string(),
            });
        }

        for source in &config.sources {
            info!(
                "reading files from url {} with {} and matches {:?}, save to {} keep_tree {}",
                source.url,
                source.revision,
                source.patterns,
                source.dest.display(),
                source.keep_tree
            );

            match self.sync_source(source) {
                Ok(source_report) => report.succeeded.push(source_report),
                Err(e) => {
                    error!("skipping source '{}': {}", source.name, e);
                    report.skipped.push(SkippedSource {
                        name: source.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Err(e) = self.provisioner.workspace().remove() {
            warn!("{}", e);
            report.cleanup_error = Some(e.to_string());
        }

        report
    }

    fn sync_source(&self, source: &SourceSpec) -> Result<SourceReport> {
        self.check_destination(source)?;
        let working_copy = self.provisioner.provision(source)?;
        let extraction = extract::extract(
            &working_copy.path,
            &source.patterns,
            &source.dest,
            source.keep_tree,
        )?;

        Ok(SourceReport {
            name: source.name.clone(),
            commit: working_copy.commit,
            dest: source.dest.clone(),
            copied: extraction.copied,
            empty_patterns: extraction.empty_patterns,
            failures: extraction.failures,
        })
    }

    fn check_destination(&self, source: &SourceSpec) -> Result<()> {
        let workspace = std::path::absolute(self.provisioner.workspace().root())?;
        let dest = std::path::absolute(&source.dest)?;
        if dest.starts_with(&workspace) {
            return Err(Error::Config {
                section: source.name.clone(),
                message: format!(
                    "dest {} is inside the workspace {}, which is removed after the run",
                    source.dest.display(),
                    workspace.display()
                ),
            });
        }
        Ok(())
    }
}
