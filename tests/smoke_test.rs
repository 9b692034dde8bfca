//! Smoke tests for the askme CLI.
//!
//! These tests verify basic CLI functionality:
//! - `askme --version` outputs version info
//! - `askme --help` outputs help text
//! - `askme` with no input exits cleanly at the sign menu

mod common;

use assert_cmd::Command;
use common::TestEnv;
use predicates::prelude::*;

/// Get a Command for the askme binary.
fn askme() -> Command {
    Command::new(env!("CARGO_BIN_EXE_askme"))
}

#[test]
fn test_version_flag() {
    askme()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("askme"))
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    askme()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("--data-dir"));
}

#[test]
fn test_unknown_command_fails() {
    askme().arg("frobnicate").assert().failure();
}

#[test]
fn test_no_args_starts_session_and_exits_on_eof() {
    let env = TestEnv::new();
    env.askme()
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("\t 1: Sign In"))
        .stdout(predicate::str::contains("\t 2: Sign Up"));
}

#[test]
fn test_first_run_is_quiet() {
    let env = TestEnv::new();
    env.askme()
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Warning").not())
        .stderr(predicate::str::is_empty());
}
