//! CLI smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("lyrebird")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("venues"));
}

#[test]
fn check_accepts_a_valid_config() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[monitor]
symbols = ["BTC-AUD"]

[[venues]]
id = "paper-1"
kind = "paper"
base_prices = {{ "BTC-AUD" = 65000 }}
"#
    )
    .unwrap();

    Command::cargo_bin("lyrebird")
        .unwrap()
        .args(["check", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("config ok"));
}

#[test]
fn check_rejects_a_missing_config() {
    Command::cargo_bin("lyrebird")
        .unwrap()
        .args(["check", "--config", "/definitely/not/here.toml"])
        .assert()
        .failure();
}

#[test]
fn check_rejects_invalid_thresholds() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[conductor]
approval_threshold = 7.0

[monitor]
symbols = ["BTC-AUD"]

[[venues]]
id = "paper-1"
kind = "paper"
base_prices = {{ "BTC-AUD" = 65000 }}
"#
    )
    .unwrap();

    Command::cargo_bin("lyrebird")
        .unwrap()
        .args(["check", "--config"])
        .arg(file.path())
        .assert()
        .failure();
}
