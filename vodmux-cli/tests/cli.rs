//! End-to-end tests for the vodmux binary.
//!
//! No network or ffmpeg binary is needed: the invocations below fail
//! before any fetch, whether or not a transcoder is installed.

use assert_cmd::Command;
use predicates::prelude::*;

fn vodmux_cmd() -> Command {
    Command::cargo_bin("vodmux").unwrap()
}

#[test]
fn no_arguments_shows_usage() {
    vodmux_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag_describes_the_tool() {
    vodmux_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--proxy"));
}

#[test]
fn failed_conversion_reports_on_stderr_and_exits_nonzero() {
    vodmux_cmd()
        .args(["not a url", "--quiet"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}
