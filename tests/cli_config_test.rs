//! Integration tests for config.kdl handling and `askme config`.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_config_show_defaults() {
    let env = TestEnv::new();

    let output = env.askme().args(["config", "show"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data-dir"]["source"], "env:ASKME_DATA_DIR");
    assert_eq!(json["anonymous-policy"]["value"], "advisory");
    assert_eq!(json["anonymous-policy"]["source"], "default");
    assert_eq!(json["action-log"]["value"], "true");
}

#[test]
fn test_config_file_and_flag_precedence() {
    let env = TestEnv::new();
    fs::write(
        env.data_path().join("config.kdl"),
        "anonymous-policy \"enforce\"\nusers-file \"people.txt\"\n",
    )
    .unwrap();

    env.askme()
        .args(["config", "show", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("anonymous-policy = enforce (config)"))
        .stdout(predicate::str::contains("people.txt (config)"));

    env.askme()
        .args(["config", "show", "-H", "--anonymous-policy", "advisory"])
        .assert()
        .success()
        .stdout(predicate::str::contains("anonymous-policy = advisory (cli)"));
}

#[test]
fn test_custom_users_file_is_used() {
    let env = TestEnv::new();
    fs::write(env.data_path().join("config.kdl"), "users-file \"people.txt\"\n").unwrap();
    fs::write(
        env.data_path().join("people.txt"),
        "7,zed,pw,Zed,zed@example.com,1\n",
    )
    .unwrap();

    env.askme()
        .args(["users", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ID: 7\t\tName: Zed"));
}

#[test]
fn test_invalid_config_fails_with_error() {
    let env = TestEnv::new();
    fs::write(env.data_path().join("config.kdl"), "anonymous-policy \"strict\"\n").unwrap();

    env.askme()
        .args(["users", "-H"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid configuration"));

    env.askme()
        .arg("users")
        .assert()
        .failure()
        .stderr(predicate::str::contains("{\"error\":"));
}

#[test]
fn test_config_init_writes_once() {
    let env = TestEnv::new();
    let path = env.data_path().join("config.kdl");

    env.askme()
        .args(["config", "init", "-H", "--anonymous-policy", "enforce"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    assert!(path.exists());

    // The written file now supplies the policy without the flag
    env.askme()
        .args(["config", "show", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("anonymous-policy = enforce (config)"))
        .stdout(predicate::str::contains("action-log = true (config)"));

    env.askme()
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"created\":false"));
}
