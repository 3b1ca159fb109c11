// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

#[test]
fn init_creates_config_and_database() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().to_string_lossy().to_string();

    run(Some("https://tasks.example.com/api".to_string()), Some(path)).unwrap();

    let work_dir = temp.path().join(".tasksync");
    let config = Config::load(&work_dir).unwrap();
    assert_eq!(config.api_base_url, "https://tasks.example.com/api");
    assert!(work_dir.join("offline.db").exists());
    assert!(work_dir.join(".gitignore").exists());
}

#[test]
fn init_twice_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().to_string_lossy().to_string();

    run(None, Some(path.clone())).unwrap();
    let result = run(None, Some(path));

    assert!(matches!(result, Err(Error::AlreadyInitialized(_))));
}

#[test]
fn init_rejects_invalid_url() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().to_string_lossy().to_string();

    let result = run(Some("ftp://tasks.example.com".to_string()), Some(path));

    assert!(result.is_err());
    assert!(!temp.path().join(".tasksync/config.toml").exists());
}
