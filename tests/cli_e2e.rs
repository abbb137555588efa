//! End-to-end checks of the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn binary() -> Command {
    Command::cargo_bin("animelon-dl").expect("binary builds")
}

#[test]
fn help_mentions_the_tool_and_flags() {
    binary()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("animelon"))
        .stdout(predicate::str::contains("--subtitles-only"))
        .stdout(predicate::str::contains("--quality-priorities"));
}

#[test]
fn missing_urls_is_a_usage_error() {
    binary()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn malformed_url_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    binary()
        .args(["-f"])
        .arg(dir.path())
        .args(["-q", "not-a-url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed URL"));
}

#[test]
fn unrecognized_page_kind_is_skipped_and_exits_cleanly() {
    let dir = TempDir::new().unwrap();
    // No network is touched: the URL classifies as an unknown page kind and
    // is skipped before any request is issued.
    binary()
        .args(["-f"])
        .arg(dir.path())
        .args(["-q", "https://animelon.com/about/team"])
        .assert()
        .success();
}
