// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::daemon::fake_daemon::FakeDaemon;
use crate::daemon::CLI_VERSION;
use crate::sync::test_helpers::{api, post, Harness};
use tempfile::tempdir;
use ts_ipc::{DaemonRequest, SYNC_TAG};

#[tokio::test]
async fn inline_drain_replays_queue() {
    let h = Harness::new(true);
    h.queue.enqueue(post(&api("tasks"), "{}")).unwrap();
    let inline = InlineSync::new(Arc::new(h.coordinator()));

    let report = inline.drain_queue().await.unwrap();

    assert_eq!(report.trigger, DrainTrigger::Manual);
    assert_eq!(report.replayed, 1);
    assert_eq!(h.queue.count().unwrap(), 0);
}

#[tokio::test]
async fn inline_register_does_not_replay() {
    let h = Harness::new(true);
    h.queue.enqueue(post(&api("tasks"), "{}")).unwrap();
    let inline = InlineSync::new(Arc::new(h.coordinator()));

    inline.register(SYNC_TAG).await.unwrap();

    assert!(h.transport.attempts().is_empty());
    assert_eq!(h.queue.count().unwrap(), 1);
}

#[tokio::test]
async fn daemon_register_sends_tag() {
    let dir = tempdir().unwrap();
    let daemon = FakeDaemon::start(dir.path(), CLI_VERSION);
    let strategy = DaemonSync::new(dir.path());

    strategy.register(SYNC_TAG).await.unwrap();

    assert_eq!(
        daemon.requests().last(),
        Some(&DaemonRequest::RegisterSync {
            tag: SYNC_TAG.to_string()
        })
    );
}

#[tokio::test]
async fn daemon_drain_returns_daemon_report() {
    let dir = tempdir().unwrap();
    let daemon = FakeDaemon::start(dir.path(), CLI_VERSION);
    let strategy = DaemonSync::new(dir.path());

    let report = strategy.drain_queue().await.unwrap();

    assert_eq!(report.started_at, 1_000);
    assert!(daemon.requests().contains(&DaemonRequest::SyncNow));
}

#[tokio::test]
async fn daemon_without_socket_is_an_error() {
    let dir = tempdir().unwrap();
    let strategy = DaemonSync::new(dir.path());

    let result = strategy.register(SYNC_TAG).await;
    assert!(matches!(result, Err(Error::Daemon(_))));
}

#[test]
fn select_inline_without_daemon() {
    let dir = tempdir().unwrap();
    let h = Harness::new(true);
    let strategy = select_strategy(dir.path(), Arc::new(h.coordinator()));
    assert_eq!(strategy.name(), "inline");
}

#[test]
fn select_daemon_when_one_answers() {
    let dir = tempdir().unwrap();
    let _daemon = FakeDaemon::start(dir.path(), CLI_VERSION);
    let h = Harness::new(true);
    let strategy = select_strategy(dir.path(), Arc::new(h.coordinator()));
    assert_eq!(strategy.name(), "daemon");
}
