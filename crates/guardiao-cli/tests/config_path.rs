use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("guardiao")
        .env("GUARDIAO_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("guardiao")
        .env("GUARDIAO_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    assert!(config_path.exists());

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("auth_timeout_secs = 15"));
    assert!(contents.contains("# api_key ="));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    fs::write(&config_path, "# existing config").unwrap();

    cargo_bin_cmd!("guardiao")
        .env("GUARDIAO_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_commands_work_with_broken_config() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "auth_timeout_secs = [").unwrap();

    cargo_bin_cmd!("guardiao")
        .env("GUARDIAO_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success();

    cargo_bin_cmd!("guardiao")
        .env("GUARDIAO_HOME", dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("load config"));
}
