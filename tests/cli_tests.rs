//! Command-line tests against the built `mdblink` binary.
//!
//! Each test points the binary at its own configuration file and driver
//! catalog so the host's ODBC setup never leaks in.

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const ODBCINST: &str = "\
[ODBC Drivers]
SQL Server = Installed
Microsoft Access Driver (*.mdb) = Installed
";

fn workspace(config: &str) -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("odbcinst.ini"), ODBCINST).unwrap();
    fs::write(dir.path().join("config.toml"), config).unwrap();
    dir
}

fn mdblink(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mdblink").unwrap();
    cmd.env("ODBCSYSINI", dir)
        .env("MDBLINK_CONFIG", dir.join("config.toml"))
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_lines(cmd: &mut Command) -> Vec<String> {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_drivers_lists_legacy_format_only() {
    let dir = workspace("");
    let lines = stdout_lines(mdblink(dir.path()).arg("drivers"));
    assert_eq!(lines, vec!["Microsoft Access Driver (*.mdb)".to_string()]);
}

#[test]
fn test_candidates_follow_configured_families() {
    let dir = workspace("[driver]\nforce_modern = true\n");
    let lines = stdout_lines(mdblink(dir.path()).args(["candidates", "people.mdb"]));
    assert_eq!(
        lines,
        vec![
            "Driver={Microsoft Access Driver (*.mdb, *.accdb)};DBQ=people.mdb".to_string(),
            "Driver={Microsoft Access Driver (*.mdb)};DBQ=people.mdb".to_string(),
        ]
    );
}

#[test]
fn test_candidates_forced_driver_as_json() {
    let dir = workspace(
        "[driver]\nname32 = \"Custom\"\nname64 = \"Custom\"\nforce32 = true\nforce64 = true\n",
    );
    let lines = stdout_lines(mdblink(dir.path()).args(["candidates", "people.mdb", "--json"]));
    let spec: serde_json::Value = serde_json::from_str(&lines.join("\n")).unwrap();
    assert_eq!(spec["path"], "people.mdb");
    assert_eq!(
        spec["connection_strings"],
        serde_json::json!(["Driver={Custom};DBQ=people.mdb"])
    );
}

#[test]
fn test_create_copies_template() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("blank.mdb");
    fs::write(&template, b"\x00\x01\x00\x00Standard Jet DB").unwrap();
    fs::write(dir.path().join("odbcinst.ini"), ODBCINST).unwrap();
    fs::write(
        dir.path().join("config.toml"),
        format!("[database]\ntemplate = {:?}\n", template.to_string_lossy()),
    )
    .unwrap();

    let target = dir.path().join("people.mdb");
    mdblink(dir.path())
        .arg("create")
        .arg(&target)
        .assert()
        .success();
    assert_eq!(fs::read(&target).unwrap(), fs::read(&template).unwrap());

    fs::write(&target, b"edited").unwrap();
    mdblink(dir.path())
        .arg("create")
        .arg(&target)
        .assert()
        .success();
    assert_eq!(fs::read(&target).unwrap(), b"edited");

    mdblink(dir.path())
        .arg("create")
        .arg(&target)
        .arg("--overwrite")
        .assert()
        .success();
    assert_eq!(fs::read(&target).unwrap(), fs::read(&template).unwrap());
}

#[test]
fn test_create_without_template_fails() {
    let dir = workspace("");
    mdblink(dir.path())
        .args(["create", "people.mdb"])
        .assert()
        .failure();
    assert!(!dir.path().join("people.mdb").exists());
}

#[test]
fn test_unknown_command_fails() {
    let dir = workspace("");
    let output = mdblink(dir.path()).arg("frobnicate").assert().failure().get_output().stderr.clone();
    assert!(String::from_utf8_lossy(&output).contains("Usage:"));
}
