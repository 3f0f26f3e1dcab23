//! # Validate Command Implementation
//!
//! Parses the configuration file and prints every source with its resolved
//! settings (revision, patterns, destination, layout). Rejected sections are
//! listed with the reason. Nothing is cloned or copied.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use rules_sync::config;
use rules_sync::defaults;
use rules_sync::output::{OutputConfig, Status};

/// Validate a configuration file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the configuration file to validate
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "RULES_SYNC_CONFIG",
        default_value = defaults::DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    println!(
        "{}",
        out.line(
            Status::Info,
            format!("Validating configuration: {}", args.config.display())
        )
    );

    let config = config::from_file(&args.config)?;

    for source in &config.sources {
        println!(
            "{}",
            out.line(Status::Ok, format!("[{}] {}", source.name, source.url))
        );
        println!("     revision:  {}", source.revision);
        println!("     match:     {}", source.patterns.join(" | "));
        println!("     dest:      {}", source.dest.display());
        println!(
            "     layout:    {}",
            if source.keep_tree { "keep tree" } else { "flatten" }
        );
    }

    for rejected in &config.rejected {
        println!("{}", out.line(Status::Error, rejected.error.to_string()));
    }

    println!();
    println!(
        "{} valid source(s), {} rejected section(s)",
        config.sources.len(),
        config.rejected.len()
    );

    if config.rejected.is_empty() {
        Ok(())
    } else {
        anyhow::bail!(
            "Configuration has {} invalid section(s)",
            config.rejected.len()
        )
    }
}
