use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const DEMO: &str = r##"{
    "name": "Coffee shop",
    "description": "Top up, then pay",
    "variables": { "TOPUP": 2000 },
    "transactionSteps": [
        {
            "label": "Top up",
            "numscript": "send [USD/2 {TOPUP}] ( source = @world destination = @users:alice )"
        },
        {
            "label": "Buy coffee",
            "numscript": "send [USD/2 450] ( source = @users:alice destination = @shops:coffee )"
        }
    ],
    "usefulQueries": [
        { "title": "Customer balances", "type": "balance", "addressPattern": "users:" }
    ]
}"##;

#[test]
fn test_cli_demo_runs_steps_and_queries() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("coffee.json");
    fs::write(&config, DEMO).unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("demo").arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Demo: Coffee shop"))
        .stdout(predicate::str::contains("Step 2: Buy coffee"))
        .stdout(predicate::str::contains("Customer balances"))
        .stdout(predicate::str::contains("$15.50"));
}

#[test]
fn test_cli_demo_json() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("coffee.json");
    fs::write(&config, DEMO).unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("demo").arg(&config).arg("--json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["steps"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["queries"][0]["result"]["rows"][0]["balance"], "1550");
}

#[test]
fn test_cli_demo_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("broken.json");
    fs::write(&config, "{ not json").unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("demo").arg(&config);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid demo configuration"));
}
