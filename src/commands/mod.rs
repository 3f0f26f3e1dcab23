//! # CLI Command Implementations
//!
//! Each subcommand of `rules-sync` lives in its own module, with an `Args`
//! struct derived with `clap` and an `execute` function that calls into the
//! `rules_sync` library.

pub mod completions;
pub mod sync;
pub mod validate;
