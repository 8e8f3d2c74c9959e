mod common;

use common::run_cli;
use serde_json::Value;

#[test]
fn rejects_invalid_json() {
    let (code, stdout, stderr) = run_cli(&[], "not json");
    assert_eq!(code, 2);
    assert!(stdout.is_empty());
    assert!(stderr.starts_with("issuetrail: parsing issue JSON"), "{stderr}");
}

#[test]
fn missing_input_file_is_an_error() {
    let (code, _, stderr) = run_cli(&["no-such-issue.json"], "");
    assert_eq!(code, 2);
    assert!(stderr.contains("reading no-such-issue.json"), "{stderr}");
}

#[test]
fn missing_explicit_config_is_an_error() {
    let (code, _, stderr) = run_cli(&["--config", "/nonexistent/issuetrail.toml"], "{}");
    assert_eq!(code, 2);
    assert!(stderr.contains("/nonexistent/issuetrail.toml"), "{stderr}");
}

#[test]
fn non_object_input_yields_error_report() {
    let (code, stdout, stderr) = run_cli(&[], "[1, 2, 3]");
    assert_eq!(code, 0);
    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["error"], "expected an issue object, got an array");
    assert_eq!(report["timeline"], serde_json::json!([]));
    assert!(report["contributors"].is_null());
    assert!(stderr.contains("input is not an issue"), "{stderr}");
}

#[test]
fn malformed_records_are_reported_not_fatal() {
    let input = r#"{
        "activities": "oops",
        "comments": [{ "text": "still here" }, 42]
    }"#;
    let (code, stdout, _) = run_cli(&[], input);
    assert_eq!(code, 0);
    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["timeline"][0]["payload"]["text"], "still here");
    assert_eq!(
        report["diagnostics"],
        serde_json::json!([
            "comments[1]: expected an object, got a number",
            "activities: expected an array, got a string"
        ])
    );
}

#[test]
fn broken_template_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("issuetrail.toml");
    std::fs::write(&config, "[report_template]\ninline = \"{% if %}\"\n").unwrap();

    let (code, _, stderr) = run_cli(&["--config", config.to_str().unwrap(), "--format", "text"], "{}");
    assert_eq!(code, 2);
    assert!(stderr.contains("template render error"), "{stderr}");
}
