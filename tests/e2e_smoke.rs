//! Smoke tests for the API server and CLI binaries
//!
//! These tests verify the binaries can be invoked and respond correctly.
//! Run with: `cargo test --test e2e_smoke`

use std::process::Command;

fn modulus() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_modulus"));
    command.env_remove("MODULUS_DISABLED_MODELS");
    command
}

fn modulus_api() -> Command {
    Command::new(env!("CARGO_BIN_EXE_modulus-api"))
}

/// Test that modulus --help lists the discovered command groups
#[test]
fn test_cli_help() {
    let output = modulus().arg("--help").output().expect("Failed to run modulus");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "modulus --help failed: stdout={}, stderr={}",
        stdout,
        stderr
    );
    assert!(
        stdout.contains("DecisionTreeModel") && stdout.contains("LinearRegressionModel"),
        "Expected command groups in help output, got: {}",
        stdout
    );
}

/// Test that modulus --version works
#[test]
fn test_cli_version() {
    let output = modulus().arg("--version").output().expect("Failed to run modulus");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "modulus --version failed");
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "Expected version output, got: {}",
        stdout
    );
}

/// Test that a group's help lists every lifecycle command
#[test]
fn test_cli_group_help() {
    let output = modulus()
        .args(["LinearRegressionModel", "--help"])
        .output()
        .expect("Failed to run modulus");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for command in [
        "extract",
        "load",
        "load_model",
        "predict",
        "retrain",
        "save_model",
        "train",
        "transform",
    ] {
        assert!(stdout.contains(command), "missing {} in: {}", command, stdout);
    }
}

/// Test that a command prints its result line
#[test]
fn test_cli_transform() {
    let output = modulus()
        .args(["DecisionTreeModel", "transform", "1,2,3;4,5,6"])
        .output()
        .expect("Failed to run modulus");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "transform failed: {}", stdout);
    assert!(
        stdout.starts_with("Result of transform:"),
        "Expected result line, got: {}",
        stdout
    );
    assert!(stdout.contains("[[1.0, 2.0], [4.0, 5.0]]"));
    assert!(stdout.contains("[3.0, 6.0]"));
}

/// Test that predicting with an untrained model fails
#[test]
fn test_cli_predict_untrained() {
    let output = modulus()
        .args(["DecisionTreeModel", "predict", "1,2"])
        .output()
        .expect("Failed to run modulus");

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not trained"),
        "Expected untrained error, got: {}",
        stderr
    );
}

/// Test that an unknown group is rejected by the parser
#[test]
fn test_cli_unknown_group() {
    let output = modulus()
        .args(["RandomForestModel", "train", "1,2"])
        .output()
        .expect("Failed to run modulus");

    assert!(!output.status.success());
}

/// Test that a disabled model has no command group
#[test]
fn test_cli_disabled_model() {
    let output = modulus()
        .env("MODULUS_DISABLED_MODELS", "decision_tree")
        .args(["DecisionTreeModel", "extract", "1,2"])
        .output()
        .expect("Failed to run modulus");

    assert!(!output.status.success());
}

/// Test that the API server fails gracefully with invalid config
#[test]
fn test_api_invalid_config() {
    let output = modulus_api()
        .args(["--config", "/nonexistent/config.toml"])
        .output()
        .expect("Failed to run modulus-api");

    assert!(
        !output.status.success(),
        "modulus-api should fail with invalid config"
    );
}

/// Test that modulus-api --help works
#[test]
fn test_api_help() {
    let output = modulus_api()
        .arg("--help")
        .output()
        .expect("Failed to run modulus-api");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "modulus-api --help failed");
    assert!(stdout.contains("--port"), "Expected help output, got: {}", stdout);
}
