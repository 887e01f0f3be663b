//! CLI tests for the sq binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn sq(dir: &TempDir) -> Command {
    let config = dir.path().join("seriesqueue.yml");
    fs::write(&config, "queue:\n  strategy: round-robin\nslot-size: 2\n").unwrap();

    let mut cmd = Command::cargo_bin("sq").unwrap();
    cmd.current_dir(dir.path()).env("NO_COLOR", "1").arg("--config").arg(&config);
    cmd
}

#[test]
fn test_strategies_lists_all() {
    let dir = TempDir::new().unwrap();
    sq(&dir)
        .arg("strategies")
        .assert()
        .success()
        .stdout(predicate::str::contains("sequential-append"))
        .stdout(predicate::str::contains("three-section-window"))
        .stdout(predicate::str::contains("* round-robin"));
}

#[test]
fn test_demo_drains_queue() {
    let dir = TempDir::new().unwrap();
    sq(&dir)
        .args(["demo", "--series", "2", "--items", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s1-0 s2-0"))
        .stdout(predicate::str::contains("s1-1 s2-1"))
        .stdout(predicate::str::contains("Queue drained"));
}

#[test]
fn test_demo_window_with_active_index() {
    let dir = TempDir::new().unwrap();
    sq(&dir)
        .args(["demo", "-s", "three-section-window", "--series", "2", "--items", "5"])
        .args(["--slot", "2", "--active", "k2", "--index", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s1-0#1 s2-0#1"))
        .stdout(predicate::str::contains("s2-3#4 s2-4#5"));
}

#[test]
fn test_run_scenario_json() {
    let dir = TempDir::new().unwrap();
    let scenario = dir.path().join("plan.yml");
    fs::write(
        &scenario,
        r#"
steps:
  - add: { key: k1, series-id: A, study-id: "1", items: [a0, a1] }
  - add: { key: k1, items: [dup] }
  - pop: null
  - status: null
"#,
    )
    .unwrap();

    sq(&dir)
        .arg("run")
        .arg(&scenario)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""step":"added""#))
        .stdout(predicate::str::contains(r#""added":false"#))
        .stdout(predicate::str::contains(r#""step":"popped""#))
        .stdout(predicate::str::contains(r#""step":"overall""#));
}

#[test]
fn test_run_reports_ignored_adds() {
    let dir = TempDir::new().unwrap();
    let scenario = dir.path().join("plan.yml");
    fs::write(
        &scenario,
        "steps:\n  - add: { key: empty, items: [] }\n  - add: { key: k1, items: [a0] }\n  - status: empty\n",
    )
    .unwrap();

    sq(&dir)
        .arg("run")
        .arg(&scenario)
        .assert()
        .success()
        .stdout(predicate::str::contains("add empty (ignored: key already tracked or no items)"))
        .stdout(predicate::str::contains("status empty done"));
}

#[test]
fn test_run_missing_scenario_fails() {
    let dir = TempDir::new().unwrap();
    sq(&dir)
        .args(["run", "missing.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read scenario file"));
}

#[test]
fn test_unknown_strategy_rejected() {
    let dir = TempDir::new().unwrap();
    sq(&dir)
        .args(["demo", "--strategy", "fastest"])
        .assert()
        .failure();
}
