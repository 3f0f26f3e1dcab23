//! # Output Configuration
//!
//! Decides whether CLI output uses colors and emoji markers.
//!
//! The following are respected, in this order:
//! - `--color=always|never|auto`
//! - `NO_COLOR` (any value) disables colors
//! - `CLICOLOR=0` disables colors
//! - `CLICOLOR_FORCE=1` forces colors even without a TTY
//! - `TERM=dumb` disables colors
//! - otherwise, whether stdout is a color-capable terminal

use std::env;

use console::style;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub use_color: bool,
}

/// Kind of line being printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warn,
    Error,
    Info,
}

impl OutputConfig {
    /// Build from the value of the `--color` flag and the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => detect_color_support(),
        };
        Self { use_color }
    }

    /// Marker placed in front of a line of the given kind.
    pub fn marker(&self, status: Status) -> String {
        if !self.use_color {
            return match status {
                Status::Ok => "[OK]",
                Status::Warn => "[WARN]",
                Status::Error => "[ERR]",
                Status::Info => "[INFO]",
            }
            .to_string();
        }
        match status {
            Status::Ok => style("✅").green().to_string(),
            Status::Warn => style("⚠️ ").yellow().to_string(),
            Status::Error => style("❌").red().to_string(),
            Status::Info => style("ℹ️ ").cyan().to_string(),
        }
    }

    /// `message` prefixed with the marker for `status`.
    pub fn line(&self, status: Status, message: impl AsRef<str>) -> String {
        format!("{} {}", self.marker(status), message.as_ref())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

fn detect_color_support() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
        return true;
    }
    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }
    console::Term::stdout().features().colors_supported()
}
