//! Binary-level tests driving the `autocorrelate` executable.

mod common;

use assert_cmd::Command;
use common::*;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn autocorrelate() -> Command {
    Command::cargo_bin("autocorrelate").unwrap()
}

#[test]
fn test_help_lists_commands() {
    autocorrelate()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("suggest"))
        .stdout(predicate::str::contains("failing"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("extract"));
}

#[test]
fn test_no_command_prints_help() {
    autocorrelate()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_suggest_text_output_from_har() {
    let temp_dir = TempDir::new().unwrap();
    let recording = write_json(temp_dir.path(), "recording.har", &login_har(RECORDED_TOKEN, 302));
    let replay = write_json(temp_dir.path(), "replay.har", &login_har(REPLAYED_TOKEN, 302));

    autocorrelate()
        .arg("suggest")
        .arg("--recording")
        .arg(&recording)
        .arg("--replay")
        .arg(&replay)
        .assert()
        .success()
        .stdout(predicate::str::contains("csrf [Replay]"))
        .stdout(predicate::str::contains(r"RF\-Token:\s(.+?)\n"))
        .stdout(predicate::str::contains("replace csrf#0 on 002 POST /login"));
}

#[test]
fn test_suggest_json_output_from_native_traces() {
    let temp_dir = TempDir::new().unwrap();
    let recording = write_trace(temp_dir.path(), "recording.json", &login_trace(RECORDED_TOKEN, 302));
    let replay = write_trace(temp_dir.path(), "replay.json", &login_trace(REPLAYED_TOKEN, 302));

    let output = autocorrelate()
        .args(["suggest", "--format", "json", "--recording"])
        .arg(&recording)
        .arg("--replay")
        .arg(&replay)
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["param_name"], "csrf");
    assert_eq!(json[0]["extractions"][0]["source_capture"], "001 GET /login");
}

#[test]
fn test_suggest_request_flag_forces_parameter() {
    let temp_dir = TempDir::new().unwrap();
    let trace = write_trace(temp_dir.path(), "same.json", &login_trace(RECORDED_TOKEN, 302));

    autocorrelate()
        .arg("suggest")
        .arg("--recording")
        .arg(&trace)
        .arg("--replay")
        .arg(&trace)
        .args(["--request", "csrf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("csrf [Replay]"));
}

#[test]
fn test_failing_command_reports_stale_token() {
    let temp_dir = TempDir::new().unwrap();
    let recording = write_json(temp_dir.path(), "recording.har", &login_har(RECORDED_TOKEN, 302));
    let replay = write_json(temp_dir.path(), "replay.har", &login_har(RECORDED_TOKEN, 403));

    autocorrelate()
        .arg("failing")
        .arg("--recording")
        .arg(&recording)
        .arg("--replay")
        .arg(&replay)
        .assert()
        .success()
        .stdout(predicate::str::contains("csrf"));
}

#[test]
fn test_failing_command_without_failures() {
    let temp_dir = TempDir::new().unwrap();
    let recording = write_json(temp_dir.path(), "recording.har", &login_har(RECORDED_TOKEN, 302));

    autocorrelate()
        .arg("failing")
        .arg("--recording")
        .arg(&recording)
        .arg("--replay")
        .arg(&recording)
        .assert()
        .success()
        .stdout(predicate::str::contains("No correlation suggestions found."));
}

#[test]
fn test_analyze_command() {
    let temp_dir = TempDir::new().unwrap();
    let recording = write_trace(temp_dir.path(), "recording.json", &login_trace(RECORDED_TOKEN, 302));

    autocorrelate()
        .arg("analyze")
        .arg("--recording")
        .arg(&recording)
        .assert()
        .success()
        .stdout(predicate::str::contains("csrf [Rules Analysis]"));
}

#[test]
fn test_extract_command_prints_parameter_trace() {
    let temp_dir = TempDir::new().unwrap();
    let trace = write_json(temp_dir.path(), "recording.har", &login_har(RECORDED_TOKEN, 302));

    let output = autocorrelate().arg("extract").arg("--trace").arg(&trace).output().unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["csrf"][0]["value"], RECORDED_TOKEN);
    assert_eq!(json["X-CSRF-Token"][0]["value"], RECORDED_TOKEN);
}

#[test]
fn test_missing_trace_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.har");

    autocorrelate()
        .arg("analyze")
        .arg("--recording")
        .arg(&missing)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load trace"));
}

#[test]
fn test_unsupported_configuration_exits_with_two() {
    let temp_dir = TempDir::new().unwrap();
    let recording = write_trace(temp_dir.path(), "recording.json", &login_trace(RECORDED_TOKEN, 302));
    let config = temp_dir.path().join("settings.ini");
    fs::write(&config, "context_length=5").unwrap();

    autocorrelate()
        .arg("analyze")
        .arg("--recording")
        .arg(&recording)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to load configuration"));
}
