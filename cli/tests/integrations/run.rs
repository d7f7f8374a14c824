use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_cli_run_simple_script() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("deposit.num");

    fs::write(
        &script,
        r#"
send [USD/2 10000] (
    source = @world
    destination = {
        10% to @platform:fees
        remaining to @users:alice
    }
)
set_tx_meta("kind", "deposit")
"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("run").arg(&script);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Transaction #1"))
        .stdout(predicate::str::contains("@platform:fees"))
        .stdout(predicate::str::contains("$10.00"))
        .stdout(predicate::str::contains("$90.00"))
        .stdout(predicate::str::contains("deposit"));
}

#[test]
fn test_cli_run_with_variables() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("pay.num");
    let vars = temp_dir.path().join("vars.json");

    fs::write(
        &script,
        "vars {\n    account $dest\n}\nsend [USD/2 {AMOUNT}] ( source = @world destination = $dest )\n",
    )
    .unwrap();
    fs::write(&vars, r#"{ "AMOUNT": 100, "dest": "users:carol" }"#).unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("run")
        .arg(&script)
        .arg("--vars-file")
        .arg(&vars)
        .arg("--var")
        .arg("AMOUNT=2500")
        .arg("--json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["transaction"]["postings"][0]["destination"], "@users:carol");
    assert_eq!(json["transaction"]["postings"][0]["amount"], "2500");
}

#[test]
fn test_cli_run_insufficient_funds() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("overdraw.num");
    fs::write(
        &script,
        "send [USD/2 100] ( source = @users:alice destination = @users:bob )",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("run").arg(&script);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Insufficient funds in @users:alice"))
        .stderr(predicate::str::contains("Missing: 100"));
}

#[test]
fn test_cli_run_missing_file() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("run").arg(temp_dir.path().join("nope.num"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read"));
}

#[test]
fn test_cli_run_rejects_bad_variable() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("deposit.num");
    fs::write(&script, "send [USD/2 1] ( source = @world destination = @a )").unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("run").arg(&script).arg("--var").arg("AMOUNT");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("expected name=value"));
}
