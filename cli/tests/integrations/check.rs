use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_cli_check_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("good.num"),
        "send [USD/2 100] ( source = @world destination = @alice )",
    )
    .unwrap();
    fs::create_dir(temp_dir.path().join("nested")).unwrap();
    fs::write(
        temp_dir.path().join("nested").join("also_good.num"),
        "send [EUR/2 5] ( source = @world destination = @bob )",
    )
    .unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "not a script").unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("check").arg(temp_dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("✓"))
        .stdout(predicate::str::contains("good.num"))
        .stdout(predicate::str::contains("also_good.num"))
        .stdout(predicate::str::contains("notes.txt").not());
}

#[test]
fn test_cli_check_reports_broken_script() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("broken.num");
    fs::write(
        &script,
        "send [USD/2 100] ( source = @world destination = @alice )\nsend [USD/2 100] ( source = @world )\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("check").arg(&script);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("✗"))
        .stdout(predicate::str::contains("Skipped send statement at line 2"))
        .stderr(predicate::str::contains("1 of 1 script(s) have problems"));
}

#[test]
fn test_cli_check_empty_directory() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("numscript").unwrap();
    cmd.arg("check").arg(temp_dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No .num files found"));
}
