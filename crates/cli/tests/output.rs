// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;
use yare::parameterized;

#[test]
fn help_lists_commands() {
    tasksync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("request"))
        .stdout(predicate::str::contains("pending"))
        .stdout(predicate::str::contains("sync"));
}

#[parameterized(
    bash = { "bash" },
    zsh = { "zsh" },
    fish = { "fish" },
)]
fn completion_generates_script(shell: &str) {
    tasksync()
        .args(["completion", shell])
        .assert()
        .success()
        .stdout(predicate::str::contains("tasksync"));
}

#[test]
fn status_reports_offline() {
    let temp = init_temp();

    tasksync()
        .arg("status")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(offline)"))
        .stdout(predicate::str::contains("Pending: 0"))
        .stdout(predicate::str::contains("Last sync: never"))
        .stdout(predicate::str::contains("Daemon: not running"));
}

#[test]
fn status_json() {
    let temp = init_temp();

    let output = tasksync()
        .args(["status", "--output", "json"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["online"], false);
    assert_eq!(status["pending_actions"], 0);
}

#[test]
fn daemon_status_not_running() {
    let temp = init_temp();

    tasksync()
        .args(["daemon", "status"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("not running"));
}

#[test]
fn daemon_stop_not_running() {
    let temp = init_temp();

    tasksync()
        .args(["daemon", "stop"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Daemon is not running."));
}
