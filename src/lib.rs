//! # Rules Sync Library
//!
//! This library pulls rule files out of upstream git repositories and copies
//! them into a local tree. It is used by the `rules-sync` command-line tool but
//! every step is available on its own.
//!
//! ## Quick Example
//!
//! ```
//! use rules_sync::config::{self, Revision};
//!
//! let config = config::parse(r#"
//! [ruleset_a]
//! url = https://example.com/a.git
//! commit = abc123
//! match = rules/**/*.yaml
//! dest = out/a
//! "#).unwrap();
//!
//! assert_eq!(config.sources.len(), 1);
//! assert_eq!(config.sources[0].revision, Revision::Commit("abc123".into()));
//! assert!(config.sources[0].keep_tree);
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: an INI document, one section per source.
//!   Parsing never performs any work.
//! - **Provisioning (`provision`, `git`, `workspace`)**: clone or reuse a
//!   working copy in a shared temporary workspace and check out the requested
//!   commit, branch or default branch.
//! - **Extraction (`extract`)**: copy the files matching a source's glob
//!   patterns into its destination, keeping or flattening directories.
//! - **Run (`sync`)**: process all sources in order, isolate per-source
//!   failures, remove the workspace and return a [`sync::RunReport`].

pub mod config;
pub mod defaults;
pub mod error;
pub mod extract;
pub mod git;
pub mod output;
pub mod provision;
pub mod sync;
pub mod workspace;

#[cfg(test)]
mod extract_proptest;
