// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Port nothing listens on; connections are refused immediately.
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9/api";

pub fn tasksync() -> Command {
    let mut cmd = cargo_bin_cmd!("tasksync");
    cmd.env_remove("TASKSYNC_STATE_DIR")
        .env_remove("TASKSYNC_TOKEN")
        .env_remove("TASKSYNC_LOG");
    cmd
}

/// Helper to create an initialized temp directory pointing at an unreachable API.
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    tasksync()
        .arg("init")
        .arg("--api-url")
        .arg(UNREACHABLE_API)
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Helper to queue a request while offline and return its action id.
pub fn queue_request(temp: &TempDir, method: &str, path: &str) -> String {
    let output = tasksync()
        .arg("request")
        .arg(method)
        .arg(path)
        .arg("--data")
        .arg(r#"{"title":"Write report"}"#)
        .current_dir(temp.path())
        .output()
        .unwrap();

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find_map(|line| line.strip_prefix("Offline: queued as "))
        .unwrap()
        .trim()
        .to_string()
}
