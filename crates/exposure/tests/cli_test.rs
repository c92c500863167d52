//! Integration tests for the `exposure` CLI binary.
//!
//! Argument parsing, help output, config handling and error exit codes run
//! without a backend. Network commands run against a local wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use exposure_api::models::Configuration;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `exposure` binary with env isolation.
///
/// Clears all `EXPOSURE_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn exposure_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("exposure");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("EXPOSURE_CONFIG_FILE")
        .env_remove("EXPOSURE_OUTPUT")
        .env_remove("EXPOSURE_BUILD_NUMBER")
        .env_remove("EXPOSURE_LANGUAGE")
        .env_remove("EXPOSURE_TIMEOUT")
        .env_remove("EXPOSURE_CA_CERT");
    cmd
}

/// Same, with `--config` pointing inside `home`.
fn configured_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = exposure_cmd(home);
    cmd.arg("--config").arg(home.join("config.toml"));
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Complete settings payload: the defaults with `overrides` applied.
fn configuration_json(overrides: serde_json::Value) -> serde_json::Value {
    let mut value = serde_json::to_value(Configuration::default()).unwrap();
    for (key, field) in overrides.as_object().unwrap() {
        value[key] = field.clone();
    }
    value
}

/// Run a prepared command off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = exposure_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_operations() {
    let home = tempfile::tempdir().unwrap();
    exposure_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("settings")
            .and(predicate::str::contains("faq"))
            .and(predicate::str::contains("keys"))
            .and(predicate::str::contains("otp"))
            .and(predicate::str::contains("upload"))
            .and(predicate::str::contains("analytics")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    exposure_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("exposure"));
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    exposure_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_output_format() {
    let home = tempfile::tempdir().unwrap();
    let output = exposure_cmd(home.path())
        .args(["--output", "invalid", "keys", "index"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_keys_subcommands_exist() {
    let home = tempfile::tempdir().unwrap();
    exposure_cmd(home.path())
        .args(["keys", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("index")
                .and(predicate::str::contains("download"))
                .and(predicate::str::contains("sync")),
        );
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    let home = tempfile::tempdir().unwrap();
    configured_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let home = tempfile::tempdir().unwrap();
    configured_cmd(home.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(home.path().join("config.toml").exists());

    configured_cmd(home.path())
        .args(["config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    configured_cmd(home.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_applies_flag_overrides() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(home.path().join("config.toml"), "build_number = 99\n").unwrap();

    let output = configured_cmd(home.path())
        .args([
            "--output",
            "json",
            "--keys-url",
            "http://localhost:5000",
            "config",
            "show",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["build_number"], 99);
    assert_eq!(shown["endpoints"]["keys"], "http://localhost:5000");
}

// ── Local validation ────────────────────────────────────────────────

#[test]
fn test_malformed_otp_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    configured_cmd(home.path())
        .args(["otp", "validate", "not-alnum!"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("otp"));
}

#[test]
fn test_dummy_dry_run_prints_uniform_bodies() {
    let home = tempfile::tempdir().unwrap();
    let output = configured_cmd(home.path())
        .args([
            "--output", "json", "analytics", "dummy", "--token", "AQID", "--count", "5",
            "--seed", "9", "--dry-run",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let bodies: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(bodies.len(), 5);
    for body in &bodies {
        assert_eq!(body["os"], "ios");
        assert_eq!(body["device_token"], "AQID");
        assert!(body["bluetooth_active"] == 0 || body["bluetooth_active"] == 1);
    }
}

#[test]
fn test_dummy_rejects_bad_token() {
    let home = tempfile::tempdir().unwrap();
    configured_cmd(home.path())
        .args(["analytics", "dummy", "--token", "%%%", "--dry-run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("base64"));
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_settings_against_mock_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/settings"))
        .and(query_param("platform", "ios"))
        .and(query_param("build", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(configuration_json(json!({
            "minimum_build_version": 17,
            "faq_url": { "en": "https://assets.example.com/faq-en.json" }
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let mut cmd = configured_cmd(home.path());
    cmd.args(["--settings-url", &server.uri(), "-o", "json", "settings", "--build", "42"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["minimum_build_version"], 17);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_faq_keeps_query_of_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/assets/faq-it.json"))
        .and(query_param("v", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "faqs": [{ "title": "Cos'è?", "content": "Un'app." }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let location = format!("{}/assets/faq-it.json?v=2", server.uri());
    let mut cmd = configured_cmd(home.path());
    cmd.args(["-o", "plain", "faq", "--language", "it", "--url", &location]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Cos'è?");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_keys_download_writes_chunks_in_order() {
    let server = MockServer::start().await;
    for n in [5_u64, 6] {
        Mock::given(method("GET"))
            .and(path(format!("/v1/keys/{n}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(format!("chunk-{n}")))
            .mount(&server)
            .await;
    }

    let home = tempfile::tempdir().unwrap();
    let out_dir = home.path().join("chunks");
    let mut cmd = configured_cmd(home.path());
    cmd.args(["--keys-url", &server.uri(), "-o", "plain", "keys", "download", "6", "5"])
        .arg("--out")
        .arg(&out_dir);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "6\n5");
    assert_eq!(std::fs::read(out_dir.join("5.zip")).unwrap(), b"chunk-5");
    assert_eq!(std::fs::read(out_dir.join("6.zip")).unwrap(), b"chunk-6");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_batch_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/keys/index"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error_code": 1302,
            "message": "No batches found."
        })))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let mut cmd = configured_cmd(home.path());
    cmd.args(["--keys-url", &server.uri(), "keys", "index"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("1302"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_otp_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/ingestion/check-otp"))
        .and(header("Content-Type", "application/json; charset=UTF-8"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error_code": 1102,
            "message": "Unauthorized OTP."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let mut cmd = configured_cmd(home.path());
    cmd.args(["--upload-url", &server.uri(), "otp", "validate", "ABCDEF1234"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[test]
fn test_unreachable_backend_exit_code() {
    let home = tempfile::tempdir().unwrap();
    configured_cmd(home.path())
        .args(["--keys-url", "http://127.0.0.1:9", "--timeout", "5", "keys", "index"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not reach the backend"));
}
