//! # Sync Command Implementation
//!
//! Runs a full synchronization: every source in the configuration file is
//! cloned (or reused) in the workspace, checked out, and its matching files
//! are copied to its destination. The workspace is removed afterwards.
//!
//! ## Exit status
//!
//! - `0`: every source was synchronized. Patterns that matched nothing are
//!   printed as warnings but do not fail the run.
//! - `1`: the configuration could not be read, or the run was only a partial
//!   success (a source was skipped, a file could not be copied, or the
//!   workspace could not be removed).

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use rules_sync::config;
use rules_sync::defaults;
use rules_sync::output::{OutputConfig, Status};
use rules_sync::sync::{RunReport, Syncer};
use rules_sync::workspace::Workspace;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "RULES_SYNC_CONFIG",
        default_value = defaults::DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Temporary directory for clones; deleted when the run ends
    #[arg(
        long,
        value_name = "DIR",
        env = "RULES_SYNC_WORKSPACE",
        default_value = defaults::DEFAULT_WORKSPACE
    )]
    pub workspace: PathBuf,

    /// Print the run report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Suppress the summary (errors are still reported)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the sync command
pub fn execute(args: SyncArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let config = config::from_file(&args.config)?;
    let report = Syncer::new(Workspace::new(args.workspace)).run(&config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !args.quiet {
        print_summary(&report, &out);
    }

    if report.is_clean() {
        Ok(())
    } else {
        anyhow::bail!(
            "Partial success: {} source(s) synchronized, {} skipped",
            report.succeeded.len(),
            report.skipped.len()
        )
    }
}

fn print_summary(report: &RunReport, out: &OutputConfig) {
    println!();
    println!(
        "{}",
        out.line(
            Status::Info,
            format!(
                "{} source(s) synchronized, {} skipped, {} file(s) copied",
                report.succeeded.len(),
                report.skipped.len(),
                report.files_copied()
            )
        )
    );

    for source in &report.succeeded {
        println!(
            "{}",
            out.line(
                Status::Ok,
                format!(
                    "{} @ {}: {} file(s) -> {}",
                    source.name,
                    short_commit(&source.commit),
                    source.copied.len(),
                    source.dest.display()
                )
            )
        );
    }

    for empty in report.empty_patterns() {
        println!(
            "{}",
            out.line(
                Status::Warn,
                format!("{}: pattern '{}' matched no files", empty.source, empty.pattern)
            )
        );
    }

    for skipped in &report.skipped {
        println!(
            "{}",
            out.line(
                Status::Error,
                format!("{} skipped: {}", skipped.name, skipped.reason)
            )
        );
    }

    for (source, failure) in report.copy_failures() {
        println!(
            "{}",
            out.line(
                Status::Error,
                format!(
                    "{}: could not copy {}: {}",
                    source,
                    failure.src.display(),
                    failure.message
                )
            )
        );
    }

    if let Some(cleanup_error) = &report.cleanup_error {
        println!("{}", out.line(Status::Warn, cleanup_error));
    }
}

fn short_commit(commit: &str) -> &str {
    commit.get(..12).unwrap_or(commit)
}
