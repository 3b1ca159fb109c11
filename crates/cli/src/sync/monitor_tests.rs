// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the connectivity monitor.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use std::sync::mpsc;
use std::time::Duration;
use tempfile::tempdir;

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn status_reflects_initial_state() {
    let monitor = ConnectivityMonitor::new(false);
    assert_eq!(
        monitor.status(),
        ConnectivityState {
            is_online: false,
            last_sync_time: None
        }
    );
}

#[test]
fn observe_same_value_is_not_a_transition() {
    let monitor = ConnectivityMonitor::new(true);
    let (tx, rx) = mpsc::channel();
    monitor.on_transition(move |t| tx.send(t).unwrap());

    assert!(!monitor.observe(true));
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn handler_fires_exactly_once_per_transition() {
    let monitor = ConnectivityMonitor::new(false);
    let (tx, rx) = mpsc::channel();
    monitor.on_transition(move |t| tx.send(t).unwrap());

    assert!(monitor.observe(true));
    assert!(!monitor.observe(true));

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), Transition::WentOnline);
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    assert!(monitor.status().is_online);
}

#[test]
fn hanging_or_panicking_handler_does_not_block_others() {
    let monitor = ConnectivityMonitor::new(true);
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    monitor.on_transition(move |_| {
        let _ = release_rx.lock().unwrap().recv();
    });
    monitor.on_transition(|_| panic!("handler failure"));
    let (tx, rx) = mpsc::channel();
    monitor.on_transition(move |t| tx.send(t).unwrap());

    monitor.observe(false);

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), Transition::WentOffline);
    release_tx.send(()).unwrap();
}

#[test]
fn unsubscribe_stops_delivery() {
    let monitor = ConnectivityMonitor::new(false);
    let (tx, rx) = mpsc::channel();
    let id = monitor.on_transition(move |t| tx.send(t).unwrap());

    assert!(monitor.unsubscribe(id));
    assert!(!monitor.unsubscribe(id));
    monitor.observe(true);

    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}

#[tokio::test]
async fn subscribe_receives_transitions_in_order() {
    let monitor = ConnectivityMonitor::new(true);
    let mut events = monitor.subscribe();

    monitor.observe(false);
    monitor.observe(true);

    assert_eq!(events.recv().await.unwrap(), Transition::WentOffline);
    assert_eq!(events.recv().await.unwrap(), Transition::WentOnline);
}

#[tokio::test]
async fn handlers_run_inside_a_runtime() {
    let monitor = ConnectivityMonitor::new(false);
    let (tx, rx) = mpsc::channel();
    monitor.on_transition(move |t| tx.send(t).unwrap());

    monitor.observe(true);

    let received = tokio::task::spawn_blocking(move || rx.recv_timeout(WAIT))
        .await
        .unwrap()
        .unwrap();
    assert!(received.is_online());
}

#[test]
fn record_sync_completion_updates_status() {
    let monitor = ConnectivityMonitor::new(true);
    monitor.record_sync_completion(1_234);
    assert_eq!(monitor.status().last_sync_time, Some(1_234));
}

#[test]
fn last_sync_time_persists_across_instances() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("offline.db");

    let monitor = ConnectivityMonitor::with_store(true, Database::open(&path).unwrap()).unwrap();
    monitor.record_sync_completion(99_000);
    drop(monitor);

    let reopened = ConnectivityMonitor::with_store(false, Database::open(&path).unwrap()).unwrap();
    assert_eq!(reopened.status().last_sync_time, Some(99_000));
    assert!(!reopened.status().is_online);
}
