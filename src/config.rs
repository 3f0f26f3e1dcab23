//! # Configuration Schema and Parsing
//!
//! This module turns the INI configuration document into typed
//! [`SourceSpec`] values. Each section of the document describes one source:
//!
//! ```ini
//! [acl4ssr]
//! url = https://github.com/ACL4SSR/ACL4SSR
//! commit = 1dc5c92b0c8ceaaecbc66530c309961f53e52c8c
//! match = Clash/*.list|Clash/Ruleset/**
//! keep_tree = false
//! ```
//!
//! ## Recognized keys
//!
//! | key         | required | meaning                                             |
//! |-------------|----------|-----------------------------------------------------|
//! | `url`       | yes      | remote repository location                          |
//! | `commit`    | no       | explicit revision, wins over `branch`               |
//! | `branch`    | no       | explicit branch                                     |
//! | `checkout`  | no       | any ref, used when neither of the above is set      |
//! | `match`     | yes      | `\|`-separated glob patterns                         |
//! | `dest`      | no       | destination directory, default `base/rules/<name>`  |
//! | `keep_tree` | no       | boolean, default `true`                             |
//! | `name`      | no       | identifier override, default is the section name    |
//!
//! Keys are matched case-insensitively. Keys outside of any section are
//! ignored.
//!
//! A section named exactly `DEFAULT` is not a source. Its keys apply to every
//! other section that does not set them itself:
//!
//! ```ini
//! [DEFAULT]
//! keep_tree = false
//!
//! [acl4ssr]
//! url = https://github.com/ACL4SSR/ACL4SSR
//! match = Clash/*.list
//! ```
//!
//! ## Failure granularity
//!
//! A document that cannot be read or is not valid INI is a fatal
//! [`Error::ConfigParse`]. A section with a missing or malformed key only
//! rejects that section: it ends up in [`Config::rejected`] and the other
//! sections are still returned. Loading never clones or copies anything.

use crate::defaults;
use crate::error::{Error, Result};
use ini::{Ini, ParseOption, Properties};
use log::debug;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Section whose keys every source inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

const KNOWN_KEYS: &[&str] = &[
    "url", "commit", "branch", "checkout", "match", "dest", "keep_tree", "name",
];

/// Which revision a working copy is checked out to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Revision {
    /// An explicit commit (or any commit-ish understood by `git checkout`).
    Commit(String),
    /// An explicit branch name.
    Branch(String),
    /// Whatever branch the repository's HEAD points at after cloning.
    Default,
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Commit(commit) => write!(f, "commit {}", commit),
            Revision::Branch(branch) => write!(f, "branch {}", branch),
            Revision::Default => write!(f, "default branch"),
        }
    }
}

/// One configured upstream repository plus its extraction rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSpec {
    /// Identifier used as clone directory name and default destination.
    pub name: String,
    /// Remote repository location.
    pub url: String,
    /// Revision to check out.
    pub revision: Revision,
    /// Glob patterns, relative to the repository root, in declared order.
    pub patterns: Vec<String>,
    /// Directory the matched files are copied into.
    pub dest: PathBuf,
    /// Preserve each file's directory relative to the repository root.
    pub keep_tree: bool,
}

/// A section that could not be turned into a [`SourceSpec`].
#[derive(Debug)]
pub struct RejectedSection {
    pub section: String,
    pub error: Error,
}

/// The parsed configuration document.
#[derive(Debug, Default)]
pub struct Config {
    /// Valid sources, in the order their sections appear.
    pub sources: Vec<SourceSpec>,
    /// Sections that were skipped, in the order they appear.
    pub rejected: Vec<RejectedSection>,
}

/// Load and parse a configuration file.
pub fn from_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        message: format!("cannot read {}: {}", path.display(), e),
        hint: Some("pass the configuration path with --config <FILE>".to_string()),
    })?;
    parse(&content)
}

/// Parse a configuration document.
pub fn parse(content: &str) -> Result<Config> {
    // Backslashes are literal so Windows-style paths survive untouched.
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let document = Ini::load_from_str_opt(content, options).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: None,
    })?;

    let mut config = Config::default();
    let mut seen_names = HashSet::new();
    let inherited = document.section(Some(DEFAULT_SECTION));

    for (section, properties) in document.iter() {
        let Some(section) = section else {
            continue;
        };
        if section == DEFAULT_SECTION {
            continue;
        }

        let keys = SectionKeys {
            own: properties,
            inherited,
        };
        match parse_section(section, &keys) {
            Ok(source) => {
                if seen_names.insert(source.name.clone()) {
                    config.sources.push(source);
                } else {
                    config.rejected.push(RejectedSection {
                        section: section.to_string(),
                        error: Error::Config {
                            section: section.to_string(),
                            message: format!(
                                "name '{}' is already used by another source",
                                source.name
                            ),
                        },
                    });
                }
            }
            Err(error) => config.rejected.push(RejectedSection {
                section: section.to_string(),
                error,
            }),
        }
    }

    Ok(config)
}

/// The keys of one section, backed by the `DEFAULT` section.
struct SectionKeys<'a> {
    own: &'a Properties,
    inherited: Option<&'a Properties>,
}

impl<'a> SectionKeys<'a> {
    fn get(&self, key: &str) -> Option<&'a str> {
        lookup(self.own, key).or_else(|| self.inherited.and_then(|p| lookup(p, key)))
    }
}

fn parse_section(section: &str, keys: &SectionKeys<'_>) -> Result<SourceSpec> {
    let invalid = |message: String| Error::Config {
        section: section.to_string(),
        message,
    };

    for (key, _) in keys.own.iter() {
        if !KNOWN_KEYS.iter().any(|known| key.eq_ignore_ascii_case(known)) {
            debug!("[{}] ignoring unknown key '{}'", section, key);
        }
    }

    let name = keys.get("name").unwrap_or(section).to_string();
    validate_name(&name).map_err(invalid)?;

    let url = keys.get("url")
        .ok_or_else(|| invalid("missing required key 'url'".to_string()))?
        .to_string();

    let revision = if let Some(commit) = keys.get("commit") {
        Revision::Commit(commit.to_string())
    } else if let Some(branch) = keys.get("branch") {
        Revision::Branch(branch.to_string())
    } else if let Some(reference) = keys.get("checkout") {
        Revision::Commit(reference.to_string())
    } else {
        Revision::Default
    };

    let patterns = split_patterns(
        keys.get("match")
            .ok_or_else(|| invalid("missing required key 'match'".to_string()))?,
    );
    if patterns.is_empty() {
        return Err(invalid("'match' contains no patterns".to_string()));
    }
    for pattern in &patterns {
        validate_pattern(pattern).map_err(invalid)?;
    }

    let dest = keys.get("dest")
        .map(PathBuf::from)
        .unwrap_or_else(|| defaults::default_dest(&name));

    let keep_tree = match keys.get("keep_tree") {
        Some(value) => parse_bool(value)
            .ok_or_else(|| invalid(format!("'keep_tree' is not a boolean: '{}'", value)))?,
        None => true,
    };

    Ok(SourceSpec {
        name,
        url,
        revision,
        patterns,
        dest,
        keep_tree,
    })
}

/// Case-insensitive key lookup. Blank values count as absent.
fn lookup<'a>(properties: &'a Properties, key: &str) -> Option<&'a str> {
    properties
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.trim())
        .last()
        .filter(|v| !v.is_empty())
}

/// Split a `|`-delimited pattern list, dropping blank entries.
pub fn split_patterns(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a boolean the way INI files usually spell them.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

// The name becomes a directory under the workspace, so it must be a single
// normal path component.
fn validate_name(name: &str) -> std::result::Result<(), String> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(format!("name '{}' is not a valid directory name", name)),
    }
}

fn validate_pattern(pattern: &str) -> std::result::Result<(), String> {
    let path = Path::new(pattern);
    if path.is_absolute() || pattern.starts_with('/') || pattern.starts_with('\\') {
        return Err(format!("pattern '{}' must be relative", pattern));
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(format!(
            "pattern '{}' must not leave the repository with '..'",
            pattern
        ));
    }
    glob::Pattern::new(pattern)
        .map(|_| ())
        .map_err(|e| format!("invalid pattern '{}': {}", pattern, e))
}
