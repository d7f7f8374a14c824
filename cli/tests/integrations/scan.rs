use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_cli_scan_unparseable_script() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("draft.num");
    fs::write(
        &script,
        r#"send [USD/2 100] ( source = @users:alice destination = @shops:coffee
set_tx_meta("order", "A1")"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("scan").arg(&script).arg("--json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["postings"][0]["source"], "users:alice");
    assert_eq!(json["postings"][0]["destination"], "shops:coffee");
    assert_eq!(json["metadata"]["tx"][0], "order");
}

#[test]
fn test_cli_scan_table() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("pay.num");
    fs::write(&script, "send [USD/2 100] ( source = @a destination = @b )").unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("scan").arg(&script);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[USD/2 100]"));
}
