//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_ecourban-cli"))
        .args(args)
        .env("ECOURBAN_DATA_DIR", data_dir)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn twenty_four(value: &str) -> String {
    vec![value; 24].join(",")
}

#[test]
fn test_predict_without_model_fails() {
    let dir = tempfile::tempdir().unwrap();
    let values = twenty_four("100");
    let (_, stderr, code) = run_cli(dir.path(), &["predict", "--values", &values]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"), "{stderr}");
    assert!(stderr.contains("train"), "{stderr}");
}

#[test]
fn test_predict_wrong_count_mentions_24() {
    let dir = tempfile::tempdir().unwrap();
    let values = vec!["1.5"; 23].join(",");
    let (_, stderr, code) = run_cli(dir.path(), &["predict", "--values", &values]);
    assert_eq!(code, 1);
    assert!(stderr.contains("24"), "{stderr}");
}

#[test]
fn test_predict_requires_a_source() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["predict"]);
    assert_ne!(code, 0);
}

#[test]
fn test_generate_writes_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["generate", "--days", "2"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("48 hourly readings"), "{stdout}");

    let csv = std::fs::read_to_string(dir.path().join("energy_data.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "timestamp,total_energy");
    assert_eq!(lines.len(), 49);
    assert!(lines[1].starts_with("2023-01-01 00:00:00,"));

    // Refuses to overwrite unless forced
    let (_, stderr, code) = run_cli(dir.path(), &["generate"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--force"), "{stderr}");
    let (_, _, code) = run_cli(dir.path(), &["generate", "--days", "3", "--force"]);
    assert_eq!(code, 0);
}

#[test]
fn test_config_get_set_path() {
    let dir = tempfile::tempdir().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "server.port"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "8000");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "training.epochs", "2"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "training.epochs"]);
    assert_eq!(stdout.trim(), "2");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));

    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "nope.nothing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));

    let (stdout, _, code) = run_cli(dir.path(), &["config", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[training]"));
}

#[test]
fn test_malformed_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "training = 5").unwrap();

    let values = twenty_four("1");
    let runs: [&[&str]; 2] = [&["config", "show"], &["predict", "--values", &values]];
    for args in runs {
        let (stdout, stderr, code) = run_cli(dir.path(), args);
        assert_eq!(code, 1);
        assert!(stdout.is_empty(), "{stdout}");
        assert!(stderr.starts_with("error: Configuration error:"), "{stderr}");
        assert!(stderr.contains("config.toml"), "{stderr}");
    }
}

#[test]
fn test_train_then_predict_and_evaluate() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["generate", "--days", "3"]);
    assert_eq!(code, 0);

    let (stdout, stderr, code) = run_cli(
        dir.path(),
        &["train", "--epochs", "1", "--hidden-size", "4", "--json"],
    );
    assert_eq!(code, 0, "{stderr}");
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    // 72 rows -> 48 windows -> 38 / 10
    assert_eq!(report["train_samples"], 38);
    assert_eq!(report["val_samples"], 10);

    let (stdout, stderr, code) = run_cli(dir.path(), &["predict", "--from-dataset", "--json"]);
    assert_eq!(code, 0, "{stderr}");
    let body: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(body["predicted_energy"].as_f64().unwrap().is_finite());

    let (stdout, _, code) = run_cli(dir.path(), &["evaluate", "--limit", "5"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("RMSE"));
}
