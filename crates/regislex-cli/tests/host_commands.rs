//! info, now, random and probe subcommands.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

fn pal() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("regislex-pal");
    cmd.arg("--log-level").arg("error");
    cmd
}

#[test]
fn info_json_has_schema_and_pid() {
    let output = pal().arg("info").arg("--json").output().unwrap();
    assert!(output.status.success());

    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(parsed["schema_id"]
        .as_str()
        .unwrap()
        .contains("system-info.schema.json"));
    assert!(parsed["pid"].as_u64().unwrap() > 0);
    assert!(parsed["cpu_count"].as_u64().unwrap() >= 1);
}

#[test]
fn info_text_lists_fields() {
    pal()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Platform:"))
        .stdout(predicate::str::contains("CPUs:"));
}

#[test]
fn now_parse_converts_to_unix_seconds() {
    pal()
        .arg("now")
        .arg("--parse")
        .arg("2024-01-15T10:30:00Z")
        .assert()
        .success()
        .stdout("1705314600\n");
}

#[test]
fn now_prints_utc_timestamp() {
    pal()
        .arg("now")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z\n$").unwrap());
}

#[test]
fn now_rejects_garbage() {
    pal()
        .arg("now")
        .arg("--parse")
        .arg("not a time")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn random_prints_requested_hex_length() {
    let output = pal().arg("random").arg("--bytes").arg("24").output().unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let hex = text.trim_end();
    assert_eq!(hex.len(), 48);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn random_rejects_zero_bytes() {
    pal()
        .arg("random")
        .arg("--bytes")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn probe_reports_open_port() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    pal()
        .arg("probe")
        .arg("127.0.0.1")
        .arg(port.to_string())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("open 127.0.0.1:"));
}

#[test]
fn probe_closed_port_fails() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    pal()
        .arg("probe")
        .arg("127.0.0.1")
        .arg(port.to_string())
        .arg("--timeout-ms")
        .arg("500")
        .assert()
        .failure()
        .code(1);
}
