// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the sync service facade.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::sync::test_helpers::{api, post, BASE};
use crate::sync::transport::{HttpRequest, HttpResponse, TransportResult};
use crate::sync::transport_tests::MockTransport;
use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::tempdir;
use ts_core::{ActionRequest, DrainTrigger, Method};

fn service(transport: &MockTransport, online: bool) -> SyncService {
    let parts = ServiceParts::new(Arc::new(transport.clone()), BASE);
    SyncService::open_in_memory(parts, online).unwrap()
}

/// Records registrations instead of scheduling anything.
#[derive(Default)]
struct RecordingBackground {
    tags: Mutex<Vec<String>>,
}

impl BackgroundSync for RecordingBackground {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn register<'a>(
        &'a self,
        tag: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        self.tags.lock().unwrap().push(tag.to_string());
        Box::pin(async { Ok(()) })
    }

    fn drain_queue(&self) -> Pin<Box<dyn Future<Output = Result<DrainReport>> + Send + '_>> {
        Box::pin(async { Ok(DrainReport::new(DrainTrigger::Background, 0)) })
    }
}

#[test]
fn enqueue_deferred_resolves_relative_urls() {
    let transport = MockTransport::new();
    let service = service(&transport, false);

    let id = service
        .enqueue_deferred(ActionRequest::new(Method::Delete, "tasks/9"))
        .unwrap();

    let pending = service.list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, id);
    assert_eq!(pending[0].url, api("tasks/9"));
    assert_eq!(service.pending_count().unwrap(), 1);
    assert!(transport.attempts().is_empty());
}

#[test]
fn open_rejects_invalid_base_url() {
    let transport = MockTransport::new();
    let parts = ServiceParts::new(Arc::new(transport), "not a url");
    let result = SyncService::open_in_memory(parts, true);
    assert!(matches!(result, Err(Error::Input(_))));
}

#[test]
fn discard_removes_action() {
    let transport = MockTransport::new();
    let service = service(&transport, false);
    let id = service.enqueue_deferred(post("tasks", "{}")).unwrap();

    service.discard(&id).unwrap();

    assert_eq!(service.pending_count().unwrap(), 0);
    assert!(matches!(
        service.discard(&id),
        Err(Error::ActionNotFound(_))
    ));
}

#[tokio::test]
async fn deferred_execute_registers_background_sync() {
    let transport = MockTransport::new();
    transport.set_offline(true);
    let background = Arc::new(RecordingBackground::default());
    let service = service(&transport, false).with_background(background.clone());

    let outcome = service.execute(post("tasks", "{}")).await.unwrap();

    assert!(matches!(outcome, RequestOutcome::Deferred { .. }));
    assert_eq!(*background.tags.lock().unwrap(), vec![SYNC_TAG.to_string()]);
}

#[tokio::test]
async fn successful_execute_does_not_register() {
    let transport = MockTransport::new();
    let background = Arc::new(RecordingBackground::default());
    let service = service(&transport, true).with_background(background.clone());

    let outcome = service.execute(post("tasks", "{}")).await.unwrap();

    assert!(matches!(outcome, RequestOutcome::Response(_)));
    assert!(background.tags.lock().unwrap().is_empty());
}

#[tokio::test]
async fn trigger_sync_uses_background_strategy() {
    let transport = MockTransport::new();
    let service = service(&transport, true)
        .with_background(Arc::new(RecordingBackground::default()));

    let report = service.trigger_sync().await.unwrap();
    assert_eq!(report.trigger, DrainTrigger::Background);
}

#[tokio::test]
async fn trigger_sync_drains_inline_by_default() {
    let transport = MockTransport::new();
    let service = service(&transport, true);
    service.enqueue_deferred(post("tasks/1", "{}")).unwrap();
    service.enqueue_deferred(post("tasks/2", "{}")).unwrap();

    let report = service.trigger_sync().await.unwrap();

    assert_eq!(service.background().name(), "inline");
    assert_eq!(report.replayed, 2);
    assert_eq!(service.pending_count().unwrap(), 0);
    assert_eq!(
        service.connectivity().last_sync_time,
        Some(report.finished_at)
    );
}

#[tokio::test]
async fn refresh_connectivity_notifies_handlers() {
    let transport = MockTransport::new();
    let service = service(&transport, true);
    let (tx, rx) = mpsc::channel();
    service.on_connectivity_change(move |t| {
        let _ = tx.send(t);
    });

    transport.set_offline(true);
    assert!(!service.refresh_connectivity().await);

    assert!(!service.connectivity().is_online);
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(2)).unwrap(),
        Transition::WentOffline
    );
    assert_eq!(
        transport.attempts()[0].url,
        format!("{}/health", BASE)
    );
}

#[tokio::test]
async fn probe_answer_with_error_status_counts_as_online() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        &format!("{}/health", BASE),
        HttpResponse::new(503, "maintenance"),
    );
    let service = service(&transport, false);

    assert!(service.refresh_connectivity().await);
    assert!(service.connectivity().is_online);
}

#[test]
fn queue_survives_reopen() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("offline.db");
    let transport = MockTransport::new();
    let open = || {
        SyncService::open(
            &db_path,
            ServiceParts::new(Arc::new(transport.clone()), BASE),
            false,
        )
        .unwrap()
    };

    let first = open();
    let a = first.enqueue_deferred(post("tasks", r#"{"n":1}"#)).unwrap();
    let b = first.enqueue_deferred(post("tasks", r#"{"n":2}"#)).unwrap();
    drop(first);

    let second = open();
    let ids: Vec<_> = second.list_pending().unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![a, b]);

    // New ids keep sorting after the stored ones.
    let c = second.enqueue_deferred(post("tasks", r#"{"n":3}"#)).unwrap();
    assert!(c > b);
}

#[test]
fn drain_lock_sits_next_to_the_database() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("offline.db");
    let transport = MockTransport::new();

    let on_disk =
        SyncService::open(&db_path, ServiceParts::new(Arc::new(transport.clone()), BASE), true)
            .unwrap();
    assert_eq!(
        on_disk.coordinator().drain_lock_path(),
        Some(dir.path().join("offline.db-drain.lock").as_path())
    );
    assert!(service(&transport, true).coordinator().drain_lock_path().is_none());
}

/// Transport that holds every send until the test adds a permit.
struct HeldTransport {
    gate: tokio::sync::Semaphore,
    sent: Mutex<Vec<String>>,
}

impl Transport for HeldTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + '_>> {
        Box::pin(async move {
            let _permit = self.gate.acquire().await.unwrap();
            self.sent
                .lock()
                .unwrap()
                .push(format!("{} {}", request.method, request.url));
            Ok(HttpResponse::new(201, "{}"))
        })
    }
}

#[tokio::test]
async fn two_services_on_one_database_replay_once() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("offline.db");
    let transport = Arc::new(HeldTransport {
        gate: tokio::sync::Semaphore::new(0),
        sent: Mutex::new(Vec::new()),
    });
    let open = || {
        let shared: Arc<dyn Transport> = transport.clone();
        SyncService::open(&db_path, ServiceParts::new(shared, BASE), true).unwrap()
    };
    let first = open();
    let second = open();
    first.enqueue_deferred(post("tasks", r#"{"n":1}"#)).unwrap();

    let (a, b, ()) = tokio::join!(first.trigger_sync(), second.trigger_sync(), async {
        transport.gate.add_permits(1);
    });
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.replayed, 1);
    assert!(b.skipped);
    assert_eq!(b.attempted, 0);
    assert_eq!(
        *transport.sent.lock().unwrap(),
        vec![format!("POST {}", api("tasks"))]
    );
    assert_eq!(second.pending_count().unwrap(), 0);
}

#[tokio::test]
async fn from_config_probes_the_configured_api() {
    let mut server = mockito::Server::new_async().await;
    let health = server
        .mock("GET", "/api/health")
        .with_status(200)
        .create_async()
        .await;

    let temp = tempdir().unwrap();
    let work_dir = crate::config::init_work_dir(temp.path(), Some(&format!("{}/api", server.url())))
        .unwrap();
    let config = Config::load(&work_dir).unwrap();

    let service = SyncService::from_config(&work_dir, &config).await.unwrap();

    health.assert_async().await;
    assert!(service.connectivity().is_online);
    assert!(work_dir.join("offline.db").exists());
}
