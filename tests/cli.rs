use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::PathBuf;

/// Helper to get a temporary home directory
fn temp_home_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Helper to get config file path in the temp dir
fn config_file_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join(".openaq-dashboard").join("config.json")
}

const BINARY_NAME: &str = "aq-dashboard";

#[test]
/// Help command should display usage information.
fn cli_help_displays_usage() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(contains("Command-line arguments"))
        .stdout(contains("snapshot"));
}

#[test]
/// Region names are listed in kebab case.
fn start_help_lists_regions() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.args(["start", "--help"]);
    cmd.assert()
        .success()
        .stdout(contains("north-america"))
        .stdout(contains("heatmap"));
}

#[test]
/// Unknown pollutants are rejected by the argument parser.
fn snapshot_rejects_unknown_pollutant() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.args(["snapshot", "--pollutant", "o3"]);
    cmd.assert().failure().stderr(contains("invalid value"));
}

#[test]
/// A corrupt config file stops the command before any request is made.
fn invalid_config_file_is_reported() {
    let tmp = temp_home_dir();
    let config_path = config_file_path(&tmp);
    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    fs::write(&config_path, "not json").unwrap();

    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.arg("snapshot")
        .env("HOME", tmp.path()) // simulate different $HOME
        .assert()
        .failure()
        .stderr(contains("Failed to read the configuration file"));
}

#[test]
/// An unreachable API makes the snapshot fail with a non-zero exit code.
fn snapshot_fails_when_api_is_unreachable() {
    let tmp = temp_home_dir();

    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.args(["snapshot", "--region", "europe"])
        .env("HOME", tmp.path())
        .env("OPENAQ_API_URL", "http://127.0.0.1:9")
        .assert()
        .failure()
        .stderr(contains("Snapshot failed"));
}
