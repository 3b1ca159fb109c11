// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::path::PathBuf;

#[test]
fn test_vars_constants() {
    assert_eq!(vars::TASKSYNC_STATE_DIR, "TASKSYNC_STATE_DIR");
    assert_eq!(vars::TASKSYNC_DAEMON_BINARY, "TASKSYNC_DAEMON_BINARY");
    assert_eq!(vars::TASKSYNC_LOG, "TASKSYNC_LOG");
    assert_eq!(vars::TASKSYNC_TOKEN, "TASKSYNC_TOKEN");
}

// Each variable is exercised by a single test so parallel tests never race on it.

#[test]
fn test_state_dir() {
    std::env::remove_var("TASKSYNC_STATE_DIR");
    assert_eq!(state_dir(), None);
    std::env::set_var("TASKSYNC_STATE_DIR", "/tmp/tasksync-test");
    assert_eq!(state_dir(), Some(PathBuf::from("/tmp/tasksync-test")));
    std::env::set_var("TASKSYNC_STATE_DIR", "");
    assert_eq!(state_dir(), None);
    std::env::remove_var("TASKSYNC_STATE_DIR");
}

#[test]
fn test_daemon_binary() {
    std::env::remove_var("TASKSYNC_DAEMON_BINARY");
    assert_eq!(daemon_binary(), None);
    std::env::set_var("TASKSYNC_DAEMON_BINARY", "/usr/local/bin/tasksyncd");
    assert_eq!(
        daemon_binary(),
        Some(PathBuf::from("/usr/local/bin/tasksyncd"))
    );
    std::env::remove_var("TASKSYNC_DAEMON_BINARY");
}

#[test]
fn test_log_filter() {
    std::env::remove_var("TASKSYNC_LOG");
    assert_eq!(log_filter(), None);
    std::env::set_var("TASKSYNC_LOG", "  ");
    assert_eq!(log_filter(), None);
    std::env::set_var("TASKSYNC_LOG", "tsync=debug");
    assert_eq!(log_filter(), Some("tsync=debug".to_string()));
    std::env::remove_var("TASKSYNC_LOG");
}

#[test]
fn test_token_trims_and_skips_empty() {
    std::env::set_var("TSYNC_TEST_TOKEN_A", " abc \n");
    assert_eq!(token("TSYNC_TEST_TOKEN_A"), Some("abc".to_string()));
    std::env::set_var("TSYNC_TEST_TOKEN_A", "");
    assert_eq!(token("TSYNC_TEST_TOKEN_A"), None);
    std::env::remove_var("TSYNC_TEST_TOKEN_A");
    assert_eq!(token("TSYNC_TEST_TOKEN_A"), None);
}
