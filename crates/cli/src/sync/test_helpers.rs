// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use ts_core::{ActionRequest, Database, ManualClock, Method};

use super::auth::{CredentialSource, StaticCredential};
use super::cache::{CachePolicy, ResponseCache};
use super::coordinator::SyncCoordinator;
use super::interceptor::RequestInterceptor;
use super::monitor::ConnectivityMonitor;
use super::queue::ActionQueue;
use super::transport_tests::MockTransport;

/// API base used by every harness.
pub const BASE: &str = "http://api.test/api";

/// Absolute URL under [`BASE`].
pub fn api(path: &str) -> String {
    format!("{}/{}", BASE, path.trim_start_matches('/'))
}

pub fn post(path: &str, body: &str) -> ActionRequest {
    ActionRequest::new(Method::Post, path)
        .with_header("Content-Type", "application/json")
        .with_body(body)
}

/// In-memory components wired to one mock server.
pub struct Harness {
    pub transport: MockTransport,
    pub clock: Arc<ManualClock>,
    pub queue: Arc<ActionQueue>,
    pub cache: Arc<ResponseCache>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub credentials: Arc<dyn CredentialSource>,
}

impl Harness {
    pub fn new(online: bool) -> Self {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let transport = MockTransport::new();
        transport.set_offline(!online);
        let queue = ActionQueue::with_clock(Database::open_in_memory().unwrap(), clock.clone());
        let cache = ResponseCache::with_clock(
            Database::open_in_memory().unwrap(),
            CachePolicy::default(),
            clock.clone(),
        );
        let monitor =
            ConnectivityMonitor::with_store(online, Database::open_in_memory().unwrap()).unwrap();

        Harness {
            transport,
            clock,
            queue: Arc::new(queue.unwrap()),
            cache: Arc::new(cache),
            monitor: Arc::new(monitor),
            credentials: Arc::new(StaticCredential::bearer("test-token")),
        }
    }

    /// Flip both the fake network and the monitor.
    pub fn set_online(&self, online: bool) {
        self.transport.set_offline(!online);
        self.monitor.observe(online);
    }

    pub fn interceptor(&self) -> RequestInterceptor {
        RequestInterceptor::new(
            Arc::new(self.transport.clone()),
            Arc::clone(&self.queue),
            Arc::clone(&self.cache),
            Arc::clone(&self.monitor),
            Arc::clone(&self.credentials),
            BASE,
        )
    }

    pub fn coordinator(&self) -> SyncCoordinator {
        SyncCoordinator::with_clock(
            Arc::clone(&self.queue),
            Arc::new(self.transport.clone()),
            Arc::clone(&self.monitor),
            Arc::clone(&self.credentials),
            self.clock.clone(),
        )
    }
}
