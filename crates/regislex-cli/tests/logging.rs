use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_log_format_text() {
    let mut cmd = cargo_bin_cmd!("regislex-pal");
    cmd.arg("--log-format")
        .arg("text")
        .arg("--log-level")
        .arg("info");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Platform:"))
        .stderr(predicate::str::contains("INFO"))
        .stderr(predicate::str::contains("regislex-pal starting"))
        .stderr(predicate::str::contains("regislex-pal finished"));
}

#[test]
fn test_log_format_json() {
    let mut cmd = cargo_bin_cmd!("regislex-pal");
    cmd.arg("--log-format")
        .arg("json")
        .arg("--log-level")
        .arg("info");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    // Every stderr line is one JSON event
    let stderr = String::from_utf8(output.stderr).unwrap();
    let log_lines: Vec<Value> = stderr
        .lines()
        .map(|line| serde_json::from_str(line).expect("stderr line should be valid JSON"))
        .collect();

    assert_eq!(log_lines.len(), 2);
    assert_eq!(log_lines[0]["level"].as_str().unwrap(), "INFO");
    assert_eq!(
        log_lines[0]["fields"]["message"].as_str().unwrap(),
        "regislex-pal starting"
    );
    assert_eq!(
        log_lines[0]["fields"]["version"].as_str().unwrap(),
        env!("CARGO_PKG_VERSION")
    );
    assert_eq!(log_lines[1]["level"].as_str().unwrap(), "INFO");
    assert_eq!(
        log_lines[1]["fields"]["message"].as_str().unwrap(),
        "regislex-pal finished"
    );
}

#[test]
fn test_log_settings_from_environment() {
    let mut cmd = cargo_bin_cmd!("regislex-pal");
    cmd.env("REGISLEX_LOG_FORMAT", "json")
        .env("REGISLEX_LOG_LEVEL", "info");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    let first = stderr.lines().next().expect("at least one log line");
    let parsed: Value = serde_json::from_str(first).expect("JSON log line");
    assert_eq!(parsed["level"].as_str(), Some("INFO"));
}

#[test]
fn test_log_level_error_is_quiet() {
    let mut cmd = cargo_bin_cmd!("regislex-pal");
    cmd.arg("--log-level").arg("error");

    cmd.assert().success().stderr(predicate::str::is_empty());
}
