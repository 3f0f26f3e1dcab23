//! # Rules Sync CLI
//!
//! Binary entry point for the `rules-sync` command-line tool.
//!
//! Its responsibilities are parsing arguments with `clap`, setting up logging
//! and dispatching to the subcommand. The actual work lives in the
//! `rules_sync` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
