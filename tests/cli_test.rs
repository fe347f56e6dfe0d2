mod server;

use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use server::get_test_server_url;
use tempfile::tempdir;

#[test]
fn test_cli_help() {
    let mut cmd = cargo::cargo_bin_cmd!("hreflint");
    let assert = cmd.arg("--help").assert();

    // On Windows, the binary name in help might be "hreflint.exe"
    let expected_pattern = if cfg!(windows) {
        "hreflint.exe [OPTIONS] [URLS]..."
    } else {
        "hreflint [OPTIONS] [URLS]..."
    };

    assert
        .success()
        .stderr(predicate::str::is_empty())
        .stdout(predicate::str::contains(expected_pattern))
        .stdout(predicate::str::contains("--require-canonical"));
}

#[test]
fn test_cli_rejects_non_http_url() {
    let dir = tempdir().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("hreflint");
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("ftp://example.com")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "URL must start with http:// or https://",
        ));
}

#[test]
fn test_cli_without_urls_fails() {
    let dir = tempdir().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("hreflint");
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No URLs to audit"));
}

#[test]
fn test_cli_with_invalid_config_format() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.txt");
    fs::write(&config_path, "invalid content").unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("hreflint");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported config file format"));
}

#[test]
fn test_cli_reads_urls_from_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("hreflint.yaml");
    fs::write(&config_path, "urls:\n  - \"mailto:someone@example.com\"\n").unwrap();

    // The configured URL is picked up from the working directory and validated
    let mut cmd = cargo::cargo_bin_cmd!("hreflint");
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("mailto:someone@example.com"));
}

#[tokio::test]
async fn test_cli_rust_log_overrides_default_level() {
    let base_url = get_test_server_url().await;
    let dir = tempdir().unwrap();
    let output = dir.path().join("results.csv");

    let mut cmd = cargo::cargo_bin_cmd!("hreflint");
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env("RUST_LOG", "hreflint=debug")
        .arg("--output")
        .arg(&output)
        .arg(format!("{}/en", base_url));

    // The spawned binary blocks, so keep the runtime free to serve its requests
    let assert = tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap();

    assert
        .success()
        .stderr(predicate::str::contains("Page evaluated"));
}

#[tokio::test]
async fn test_cli_default_level_hides_debug_logs() {
    let base_url = get_test_server_url().await;
    let dir = tempdir().unwrap();
    let output = dir.path().join("results.csv");

    let mut cmd = cargo::cargo_bin_cmd!("hreflint");
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env_remove("RUST_LOG")
        .arg("--output")
        .arg(&output)
        .arg(format!("{}/en", base_url));

    let assert = tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap();

    assert
        .success()
        .stderr(predicate::str::contains("Page evaluated").not());
}

#[test]
fn test_cli_rejects_non_positive_rate_limit() {
    let dir = tempdir().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("hreflint");
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["--rate-limit", "0", "https://example.com/en"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Rate limit must be greater than 0"));
}
