//! End-to-end tests for the `sync` command
//!
//! These tests invoke the actual CLI binary against local git repositories
//! and validate its behavior from a user's perspective.

#[allow(dead_code)]
mod common;
use common::prelude::*;

fn config_for(fixture: &TestFixture, sections: &[(&str, &Upstream, &str, bool)]) -> String {
    sections
        .iter()
        .map(|(name, upstream, pattern, keep_tree)| {
            format!(
                "[{}]\nurl = {}\nmatch = {}\ndest = {}\nkeep_tree = {}\n\n",
                name,
                upstream.url(),
                pattern,
                fixture.out(name).display(),
                keep_tree
            )
        })
        .collect()
}

#[test]
fn test_sync_help() {
    let mut cmd = cargo_bin_cmd!("rules-sync");

    cmd.arg("sync")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--workspace"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("RULES_SYNC_CONFIG"));
}

#[test]
fn test_sync_missing_config_fails() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("sync")
        .arg("--config")
        .arg("/nonexistent/rules_config.conf")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration parsing error"));
}

#[test]
fn test_sync_missing_default_config_fails() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("rules_config.conf"));
}

#[test]
fn test_sync_copies_files_and_reports() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new();
    let upstream = fixture.upstream("lists");
    upstream.write("Clash/a.list", "a");
    upstream.write("Clash/Sub/b.list", "b");
    upstream.commit("lists");

    let config = fixture.with_config(&config_for(
        &fixture,
        &[("lists", &upstream, "Clash/**/*.list|Missing/*.list", false)],
    ));

    fixture
        .command()
        .arg("sync")
        .arg("--config")
        .arg(&config)
        .arg("--workspace")
        .arg(fixture.workspace())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 source(s) synchronized, 0 skipped"))
        .stdout(predicate::str::contains(
            "[WARN] lists: pattern 'Missing/*.list' matched no files",
        ))
        .stderr(predicate::str::contains("matched no files"));

    fixture.child("out/lists/a.list").assert("a");
    fixture.child("out/lists/b.list").assert("b");
    assert!(!fixture.workspace().exists());
}

#[test]
fn test_sync_partial_success_exits_with_error() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new();
    let upstream = fixture.upstream("good");
    upstream.write("a.list", "a");
    upstream.commit("a");

    let mut text = format!(
        "[broken]\nurl = {}\nmatch = *.list\ndest = {}\n\n",
        fixture.path().join("nowhere").display(),
        fixture.out("broken").display()
    );
    text.push_str(&config_for(&fixture, &[("good", &upstream, "*.list", true)]));
    let config = fixture.with_config(&text);

    fixture
        .command()
        .arg("sync")
        .arg("--config")
        .arg(&config)
        .arg("--workspace")
        .arg(fixture.workspace())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[ERR] broken skipped"))
        .stderr(predicate::str::contains("Partial success"));

    fixture.child("out/good/a.list").assert("a");
    fixture.child("out/broken").assert(predicate::path::missing());
}

#[test]
fn test_sync_json_report() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new();
    let upstream = fixture.upstream("lists");
    upstream.write("a.list", "a");
    upstream.commit("a");

    let config = fixture.with_config(&config_for(&fixture, &[("lists", &upstream, "*.list", true)]));

    let output = fixture
        .command()
        .arg("sync")
        .arg("--config")
        .arg(&config)
        .arg("--workspace")
        .arg(fixture.workspace())
        .arg("--json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["succeeded"][0]["name"], "lists");
    assert_eq!(report["succeeded"][0]["copied"].as_array().unwrap().len(), 1);
    assert_eq!(report["skipped"].as_array().unwrap().len(), 0);
}

#[test]
fn test_sync_quiet_prints_no_summary() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new();
    let upstream = fixture.upstream("lists");
    upstream.write("a.list", "a");
    upstream.commit("a");

    let config = fixture.with_config(&config_for(&fixture, &[("lists", &upstream, "*.list", true)]));

    fixture
        .command()
        .arg("--log-level")
        .arg("error")
        .arg("sync")
        .arg("--config")
        .arg(&config)
        .arg("--workspace")
        .arg(fixture.workspace())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_sync_uses_environment_variables() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new();
    let upstream = fixture.upstream("lists");
    upstream.write("a.list", "a");
    upstream.commit("a");

    let config = fixture.with_config(&config_for(&fixture, &[("lists", &upstream, "*.list", true)]));

    fixture
        .command()
        .env("RULES_SYNC_CONFIG", &config)
        .env("RULES_SYNC_WORKSPACE", fixture.workspace())
        .arg("sync")
        .assert()
        .success();

    fixture.child("out/lists/a.list").assert("a");
}
