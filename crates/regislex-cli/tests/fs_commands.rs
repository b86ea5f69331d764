//! Filesystem subcommands, each run against a scratch directory.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn pal() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("regislex-pal");
    cmd.arg("--log-level").arg("error");
    cmd
}

#[test]
fn mkdir_cp_mv_rm_round() {
    let scratch = TempDir::new().unwrap();
    let deep = scratch.path().join("a").join("b").join("c");

    pal().arg("mkdir").arg("-p").arg(&deep).assert().success();
    assert!(deep.is_dir());

    // Without -p an existing directory is an error
    pal()
        .arg("mkdir")
        .arg(&deep)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"));

    let source = scratch.path().join("source.txt");
    std::fs::write(&source, "hello regislex").unwrap();
    let copy = deep.join("copy.txt");
    pal().arg("cp").arg(&source).arg(&copy).assert().success();
    assert_eq!(std::fs::read_to_string(&copy).unwrap(), "hello regislex");

    let moved = deep.join("moved.txt");
    pal().arg("mv").arg(&copy).arg(&moved).assert().success();
    assert!(!copy.exists());
    assert!(moved.exists());

    let top = scratch.path().join("a");
    pal()
        .arg("rm")
        .arg(&top)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
    pal().arg("rm").arg("-r").arg(&top).assert().success();
    assert!(!top.exists());

    pal().arg("rm").arg(&source).assert().success();
    assert!(!source.exists());
}

#[cfg(unix)]
#[test]
fn rm_recursive_on_link_removes_only_the_link() {
    let scratch = TempDir::new().unwrap();
    let docket = scratch.path().join("docket");
    std::fs::create_dir(&docket).unwrap();
    std::fs::write(docket.join("filing.txt"), "motion").unwrap();
    let link = scratch.path().join("shortcut");
    std::os::unix::fs::symlink(&docket, &link).unwrap();

    pal().arg("rm").arg("-r").arg(&link).assert().success();

    assert!(std::fs::symlink_metadata(&link).is_err());
    assert_eq!(
        std::fs::read_to_string(docket.join("filing.txt")).unwrap(),
        "motion"
    );
}

#[test]
fn ls_json_lists_entries_sorted() {
    let scratch = TempDir::new().unwrap();
    std::fs::write(scratch.path().join("b.txt"), [0u8; 10]).unwrap();
    std::fs::write(scratch.path().join("a.txt"), [0u8; 3]).unwrap();
    std::fs::create_dir(scratch.path().join("sub")).unwrap();

    let output = pal()
        .arg("ls")
        .arg("--json")
        .arg(scratch.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(parsed["schema_id"]
        .as_str()
        .unwrap()
        .contains("dir-listing.schema.json"));

    let entries = parsed["entries"].as_array().unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["a.txt", "b.txt", "sub"]);
    assert_eq!(entries[0]["size"].as_u64(), Some(3));
    assert_eq!(entries[2]["is_directory"].as_bool(), Some(true));
}

#[test]
fn ls_missing_directory_fails() {
    let scratch = TempDir::new().unwrap();
    pal()
        .arg("ls")
        .arg(scratch.path().join("missing"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Not found"));
}
